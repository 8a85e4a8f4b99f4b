//! Tenant-scoped file storage
//!
//! This crate exposes one subtree of a shared filesystem per tenant and guarantees that no
//! operation can read, write, or delete outside that subtree.
//!
//! ## Layout
//!
//! ```text
//! <storage_base>/
//! └── users/
//!     └── <tenant-id>/      # tenant root, created lazily
//!         ├── photos/
//!         │   └── cat.png
//!         └── notes.txt
//! ```
//!
//! ## Path model
//!
//! Callers address entries with slash-separated paths relative to the tenant root. Every
//! path is normalised against the absolute root and must land on the root itself or one of
//! its descendants; anything else is a [`FilesError::PathTraversal`]. Existing entries are
//! additionally canonicalised so a symlink cannot be used to step outside the root.
//!
//! The filesystem is the only source of truth. There is no metadata store, no locking and no
//! caching: operations racing on the same tenant may observe each other's partial effects.
//!
//! ## Example Usage
//!
//! ```no_run
//! use panel_files::{FileStore, TenantId, UploadPayload};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FileStore::new(Path::new("storage"))?;
//! let tenant = TenantId::parse("550e8400-e29b-41d4-a716-446655440000")?;
//!
//! let files = store.tenant(tenant);
//! files.make_directory("", "photos")?;
//! files.save_upload("photos", "cat.png", UploadPayload::Memory(b"meow".to_vec()))?;
//! let listing = files.list("photos")?;
//! assert_eq!(listing.items.len(), 1);
//! # Ok(())
//! # }
//! ```

mod copy;
mod entry;
mod paths;
mod store;

pub use entry::{DirectoryEntry, DownloadTarget, EntryKind, Listing, UploadPayload};
pub use panel_types::SegmentName;
pub use panel_uuid::TenantId;
pub use paths::ResolvedPath;
pub use store::{FileStore, TenantFiles};

/// Errors that can occur during file operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Storage base does not exist or is not a directory
    #[error("Invalid storage base: {0}")]
    InvalidStorageBase(String),

    /// Tenant identifier is not canonical
    #[error("Invalid tenant: {0}")]
    InvalidTenant(#[from] panel_uuid::UuidError),

    /// The path resolves outside the tenant root
    #[error("Path traversal attempt detected: '{0}'")]
    PathTraversal(String),

    /// A name that must be a single path segment was empty or contained a separator
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// The operation needs a non-empty relative path
    #[error("Path is required")]
    PathRequired,

    /// The source path of an operation does not exist
    #[error("Not found: '{0}'")]
    NotFound(String),

    /// A directory was expected but the path is a file
    #[error("Not a directory: '{0}'")]
    NotADirectory(String),

    /// A file was expected but the path is a directory
    #[error("Is a directory: '{0}'")]
    IsADirectory(String),

    /// A move or copy would place a directory inside itself, or a copy onto itself
    #[error("Invalid destination: '{0}'")]
    InvalidDestination(String),

    /// Upload content was not provided in a usable form
    #[error("Unsupported upload payload")]
    UnsupportedPayload,

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for file operations.
pub type FilesResult<T> = Result<T, FilesError>;

/// Wraps an I/O error with the operation and path that produced it.
///
/// The message carries absolute paths, so it is meant for logs, not for callers.
pub(crate) fn io_context(e: std::io::Error, action: &str, path: &std::path::Path) -> FilesError {
    FilesError::Io(std::io::Error::new(
        e.kind(),
        format!("Failed to {} {}: {}", action, path.display(), e),
    ))
}
