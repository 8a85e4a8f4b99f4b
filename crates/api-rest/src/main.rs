//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own, without the workspace runner.
//!
//! ## Intended use
//! Useful during development when iterating on the API with the Swagger UI at `/swagger-ui`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("-- Starting panel REST API");
    api_rest::startup::from_env()?.serve().await
}
