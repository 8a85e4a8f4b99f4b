//! Constants used throughout the panel core crate.

/// Directory, relative to the working directory, used as storage base when none is configured.
pub const DEFAULT_STORAGE_DIR: &str = "storage";

/// Default REST bind address.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:4000";

/// Default origin allowed by CORS (the SPA dev server).
pub const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:5173";

/// Default maximum size of a multipart upload, in MiB.
pub const DEFAULT_UPLOAD_LIMIT_MB: usize = 100;

/// Maximum size of a JSON request body, in bytes.
pub const JSON_BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

/// Lifetime of issued bearer tokens, in days.
pub const TOKEN_TTL_DAYS: i64 = 7;
