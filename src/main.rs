//! Workspace runner for the hosting panel.
//!
//! Loads `.env`, initialises tracing, provisions the admin tenant (when configured) and serves
//! the file manager REST API with its Swagger UI.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the panel
///
/// # Environment Variables
/// - `PANEL_REST_ADDR`: REST server address (default: "0.0.0.0:4000")
/// - `FILES_ROOT`: storage base for tenant files (default: "./storage")
/// - `JWT_SECRET`: secret for bearer tokens (required)
/// - `FRONTEND_ORIGIN`, `UPLOAD_LIMIT_MB`, `ADMIN_TENANT_ID`: see `api_rest::startup`
///
/// # Returns
/// * `Ok(())` - If the server shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration is invalid or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("panel=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("panel_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("++ Starting panel {}", env!("CARGO_PKG_VERSION"));

    api_rest::startup::from_env()?.serve().await
}
