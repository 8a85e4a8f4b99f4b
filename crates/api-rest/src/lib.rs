//! # API REST
//!
//! REST API implementation for the hosting panel's file manager.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (bearer authentication, body limits, CORS, streaming downloads)
//!
//! Uses `api-shared` for wire types and token handling, and `panel-core` for storage.

#![warn(rust_2018_idioms)]

mod auth;
mod error;
mod extract;
mod files;
pub mod startup;

pub use auth::Tenant;
pub use error::ApiError;

use api_shared::{
    ErrorRes, HealthRes, HealthService, ListFilesRes, MkdirReq, MkdirRes, OkRes, RenameReq,
    TokenService, TransferReq, UploadRes,
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    response::Json,
    routing::{get, post},
    Router,
};
use panel_core::StorageService;
use std::convert::Infallible;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Shared state for all request handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub storage: StorageService,
    pub tokens: TokenService,
}

/// HTTP-level settings resolved at startup.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Maximum multipart upload body, in bytes
    pub upload_limit_bytes: usize,
    /// Maximum JSON body, in bytes
    pub json_limit_bytes: usize,
    /// Origin allowed by CORS
    pub frontend_origin: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        files::list_root,
        files::list,
        files::upload,
        files::mkdir,
        files::rename,
        files::move_entry,
        files::copy_entry,
        files::download,
        files::remove,
    ),
    components(schemas(
        HealthRes,
        ErrorRes,
        OkRes,
        ListFilesRes,
        api_shared::DirectoryEntryRes,
        MkdirReq,
        MkdirRes,
        UploadRes,
        RenameReq,
        TransferReq,
    ))
)]
pub struct ApiDoc;

/// Builds the application router.
///
/// Fails only when `frontend_origin` is not a valid header value.
pub fn router(state: AppState, cfg: &ApiConfig) -> anyhow::Result<Router> {
    let origin: HeaderValue = cfg.frontend_origin.parse()?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let upload = post(files::upload)
        .layer::<_, Infallible>(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(cfg.upload_limit_bytes));

    let app = Router::new()
        .route("/healthz", get(health))
        .route("/api/files", get(files::list_root))
        .route("/api/files/", get(files::list_root).delete(files::remove_root))
        .route("/api/files/upload", upload)
        .route("/api/files/mkdir", post(files::mkdir))
        .route("/api/files/rename", post(files::rename))
        .route("/api/files/move", post(files::move_entry))
        .route("/api/files/copy", post(files::copy_entry))
        .route("/api/files/download/*path", get(files::download))
        .route("/api/files/*path", get(files::list).delete(files::remove))
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(DefaultBodyLimit::max(cfg.json_limit_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Liveness check; needs no authentication.
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[cfg(test)]
mod tests;
