//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services. The
//! intent is to avoid reading process-wide environment variables during request handling,
//! which can lead to inconsistent behaviour in multi-threaded runtimes and test harnesses.
//!
//! The helpers here take already-read values (`Option<String>` / `Option<PathBuf>`) instead of
//! reading the environment themselves, so binaries decide where values come from and tests can
//! exercise every branch without touching process state.

use crate::constants::{DEFAULT_STORAGE_DIR, DEFAULT_UPLOAD_LIMIT_MB};
use crate::{CoreError, CoreResult};
use panel_uuid::TenantId;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    storage_base: PathBuf,
    admin_tenant: Option<TenantId>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `storage_base` must be absolute; use [`resolve_storage_base`] to obtain one.
    pub fn new(storage_base: PathBuf, admin_tenant: Option<TenantId>) -> CoreResult<Self> {
        if !storage_base.is_absolute() {
            return Err(CoreError::InvalidInput(format!(
                "storage base must be absolute, got {}",
                storage_base.display()
            )));
        }

        Ok(Self {
            storage_base,
            admin_tenant,
        })
    }

    pub fn storage_base(&self) -> &Path {
        &self.storage_base
    }

    /// Tenant whose storage is provisioned at startup, if configured.
    pub fn admin_tenant(&self) -> Option<&TenantId> {
        self.admin_tenant.as_ref()
    }
}

/// Resolve the storage base directory without reading environment variables.
///
/// A non-empty `override_dir` wins; relative overrides are taken relative to `working_dir`.
/// Otherwise the base is `working_dir/storage`.
pub fn resolve_storage_base(override_dir: Option<PathBuf>, working_dir: &Path) -> PathBuf {
    match override_dir.filter(|dir| !dir.as_os_str().is_empty()) {
        Some(dir) if dir.is_absolute() => dir,
        Some(dir) => working_dir.join(dir),
        None => working_dir.join(DEFAULT_STORAGE_DIR),
    }
}

/// Create the storage base (and its parents) if it does not exist.
///
/// This is intended to be run once at startup, before a [`panel_files::FileStore`] is built.
pub fn prepare_storage_base(storage_base: &Path) -> CoreResult<()> {
    if storage_base.exists() && !storage_base.is_dir() {
        return Err(CoreError::InvalidInput(format!(
            "storage base exists but is not a directory: {}",
            storage_base.display()
        )));
    }
    std::fs::create_dir_all(storage_base).map_err(CoreError::StorageDirCreation)
}

/// Parse the upload limit (in MiB) from an optional string value, returning bytes.
///
/// If `value` is `None` or empty/whitespace, returns the default limit.
pub fn upload_limit_from_env_value(value: Option<String>) -> CoreResult<usize> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let megabytes = match value {
        Some(v) => v.parse::<usize>().map_err(|e| {
            CoreError::InvalidInput(format!("UPLOAD_LIMIT_MB must be a whole number: {}", e))
        })?,
        None => DEFAULT_UPLOAD_LIMIT_MB,
    };

    if megabytes == 0 {
        return Err(CoreError::InvalidInput(
            "UPLOAD_LIMIT_MB must be greater than zero".into(),
        ));
    }

    megabytes
        .checked_mul(1024 * 1024)
        .ok_or_else(|| CoreError::InvalidInput("UPLOAD_LIMIT_MB is too large".into()))
}

/// Parse an optional tenant identifier (for example `ADMIN_TENANT_ID`).
///
/// `None` or empty/whitespace yields `Ok(None)`.
pub fn tenant_from_env_value(value: Option<String>) -> CoreResult<Option<TenantId>> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(|v| TenantId::parse(&v).map_err(|e| CoreError::InvalidInput(e.to_string())))
        .transpose()
}
