//! # Panel Core
//!
//! Core runtime wiring for the hosting panel.
//!
//! This crate resolves configuration and provisions tenant storage:
//! - Startup configuration (`CoreConfig`) resolved once and shared
//! - Storage base preparation and tenant-root provisioning
//!
//! **No API concerns**: authentication and HTTP belong in `api-shared` and `api-rest`.

pub mod config;
pub mod constants;
mod error;
pub mod storage;

pub use config::CoreConfig;
pub use constants::*;
pub use error::{CoreError, CoreResult};
pub use storage::StorageService;

pub use panel_files;
pub use panel_files::{FileStore, FilesError, TenantFiles, UploadPayload};
pub use panel_uuid::TenantId;
