//! Tenant identifiers and tenant-root derivation.
//!
//! Every hosting account owns one subtree of the shared file store. The subtree is addressed
//! by the account's tenant identifier, so the identifier is also a path segment on disk.
//!
//! To keep that safe and deterministic the panel uses a *canonical* UUID representation:
//! **36 lowercase characters, hyphenated** (the form `Uuid::new_v4().hyphenated()` produces and
//! the form stored in account rows and token subjects).
//!
//! - Use [`TenantId::parse`] for externally supplied values (token `sub` claims, CLI input).
//! - Non-canonical values (uppercase, braced, simple/unhyphenated, wrong length) are rejected
//!   rather than normalised, so one tenant can never be reachable under two directory names.
//!
//! ## Layout
//! For a canonical id `t`, the tenant root is:
//! `storage_base/users/<t>/`

mod tenant;

pub use tenant::{TenantId, Uuid, USERS_DIR_NAME};

/// Error type for tenant identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for tenant identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
