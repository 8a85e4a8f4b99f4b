//! # API Shared
//!
//! Shared utilities and definitions for the panel APIs.
//!
//! Contains:
//! - Wire types for the file manager (`dto` module)
//! - Shared services like `HealthService`
//! - Bearer token issuing and verification (used by the REST API and the CLI)

pub mod auth;
pub mod dto;
pub mod health;

pub use auth::{AuthError, Claims, TokenService};
pub use dto::*;
pub use health::HealthService;
