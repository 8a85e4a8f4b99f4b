//! Storage provisioning for hosting accounts.
//!
//! A hosting account's file area is its tenant root. Real infrastructure (system users, FTP,
//! mail, databases) is out of reach here; provisioning only guarantees the directory exists.

use crate::{CoreConfig, CoreResult};
use panel_files::{FileStore, TenantFiles};
use panel_uuid::TenantId;
use std::path::PathBuf;
use std::sync::Arc;

/// Entry point from configuration to tenant-scoped file operations.
#[derive(Clone, Debug)]
pub struct StorageService {
    cfg: Arc<CoreConfig>,
    store: FileStore,
}

impl StorageService {
    /// Builds the service over the configured storage base, which must already exist
    /// (see [`crate::config::prepare_storage_base`]).
    pub fn new(cfg: Arc<CoreConfig>) -> CoreResult<Self> {
        let store = FileStore::new(cfg.storage_base())?;
        Ok(Self { cfg, store })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// File operations scoped to `tenant`.
    pub fn files(&self, tenant: TenantId) -> TenantFiles {
        self.store.tenant(tenant)
    }

    /// Creates the tenant root for a newly provisioned hosting account.
    ///
    /// Idempotent: provisioning an existing account leaves its files untouched.
    pub fn provision(&self, tenant: TenantId) -> CoreResult<PathBuf> {
        let root = self.files(tenant).ensure_root()?;
        tracing::info!(%tenant, "provisioned tenant storage");
        Ok(root)
    }

    /// Provisions the configured admin tenant, if any.
    pub fn provision_admin(&self) -> CoreResult<Option<PathBuf>> {
        match self.cfg.admin_tenant() {
            Some(tenant) => self.provision(*tenant).map(Some),
            None => Ok(None),
        }
    }
}
