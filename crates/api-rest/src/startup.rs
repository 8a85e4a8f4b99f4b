//! Process startup shared by the server binaries.
//!
//! Environment variables are read here, once, and turned into `CoreConfig` / `ApiConfig`.
//! Nothing below this point reads the environment.

use crate::{router, ApiConfig, AppState};
use anyhow::Context;
use api_shared::TokenService;
use axum::Router;
use panel_core::config::{
    prepare_storage_base, resolve_storage_base, tenant_from_env_value, upload_limit_from_env_value,
};
use panel_core::{
    CoreConfig, StorageService, DEFAULT_FRONTEND_ORIGIN, DEFAULT_REST_ADDR, JSON_BODY_LIMIT_BYTES,
    TOKEN_TTL_DAYS,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything needed to serve the REST API.
pub struct Server {
    pub addr: String,
    pub app: Router,
}

/// Builds the server from environment variables.
///
/// # Environment Variables
/// - `FILES_ROOT`: storage base (default: `<cwd>/storage`)
/// - `PANEL_REST_ADDR`: bind address (default: `0.0.0.0:4000`)
/// - `JWT_SECRET`: bearer token secret (required)
/// - `FRONTEND_ORIGIN`: CORS origin (default: `http://localhost:5173`)
/// - `UPLOAD_LIMIT_MB`: multipart limit in MiB (default: 100)
/// - `ADMIN_TENANT_ID`: tenant whose storage is provisioned at startup (optional)
///
/// # Errors
/// Returns an error if `JWT_SECRET` is missing, a value fails to parse, or the storage base
/// cannot be prepared.
pub fn from_env() -> anyhow::Result<Server> {
    let secret = std::env::var("JWT_SECRET")
        .ok()
        .filter(|s| !s.trim().is_empty());
    let Some(secret) = secret else {
        anyhow::bail!("JWT_SECRET is not set");
    };

    let working_dir = std::env::current_dir().context("cannot determine working directory")?;
    let storage_base = resolve_storage_base(
        std::env::var("FILES_ROOT").ok().map(PathBuf::from),
        &working_dir,
    );
    prepare_storage_base(&storage_base)?;

    let admin_tenant = tenant_from_env_value(std::env::var("ADMIN_TENANT_ID").ok())?;
    let cfg = Arc::new(CoreConfig::new(storage_base, admin_tenant)?);
    let storage = StorageService::new(cfg)?;
    if let Some(root) = storage.provision_admin()? {
        tracing::info!("admin storage ready at {}", root.display());
    }

    let api = ApiConfig {
        upload_limit_bytes: upload_limit_from_env_value(std::env::var("UPLOAD_LIMIT_MB").ok())?,
        json_limit_bytes: JSON_BODY_LIMIT_BYTES,
        frontend_origin: std::env::var("FRONTEND_ORIGIN")
            .unwrap_or_else(|_| DEFAULT_FRONTEND_ORIGIN.into()),
    };
    tracing::info!(
        storage_base = %storage.store().storage_base().display(),
        upload_limit_bytes = api.upload_limit_bytes,
        frontend_origin = %api.frontend_origin,
        "configuration resolved"
    );

    let state = AppState {
        storage,
        tokens: TokenService::new(secret, TOKEN_TTL_DAYS),
    };

    Ok(Server {
        addr: std::env::var("PANEL_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into()),
        app: router(state, &api)?,
    })
}

impl Server {
    /// Binds and serves until ctrl-c.
    pub async fn serve(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .with_context(|| format!("cannot bind {}", self.addr))?;
        tracing::info!("++ Serving panel REST API on {}", self.addr);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("failed to listen for shutdown signal: {}", e);
                }
            })
            .await?;
        Ok(())
    }
}
