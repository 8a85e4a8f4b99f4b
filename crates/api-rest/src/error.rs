//! Mapping of domain failures onto HTTP responses.

use api_shared::{AuthError, ErrorRes};
use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use panel_core::FilesError;

#[derive(Debug)]
pub enum ApiError {
    Files(FilesError),
    Auth(AuthError),
    /// Request is missing something the handler needs; the message is shown to the caller
    BadRequest(&'static str),
    /// Malformed or oversized multipart body
    Multipart(MultipartError),
    /// JSON body that is not valid JSON or does not fit the request type
    Json(JsonRejection),
    /// Failure with no caller-facing detail (already logged)
    Internal,
}

impl From<FilesError> for ApiError {
    fn from(e: FilesError) -> Self {
        ApiError::Files(e)
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Auth(e)
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        ApiError::Multipart(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::Json(e)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        tracing::error!("blocking file task failed: {}", e);
        ApiError::Internal
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Files(e) => match e {
                FilesError::PathTraversal(_)
                | FilesError::InvalidName(_)
                | FilesError::PathRequired
                | FilesError::UnsupportedPayload
                | FilesError::NotADirectory(_)
                | FilesError::IsADirectory(_)
                | FilesError::InvalidDestination(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                FilesError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
                FilesError::InvalidStorageBase(_)
                | FilesError::InvalidTenant(_)
                | FilesError::Io(_) => internal(),
            },
            ApiError::Auth(AuthError::Signing) => internal(),
            ApiError::Auth(e) => (StatusCode::UNAUTHORIZED, e.to_string()),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, (*message).to_owned()),
            ApiError::Multipart(e) => (e.status(), e.body_text()),
            ApiError::Json(e) => (StatusCode::BAD_REQUEST, e.body_text()),
            ApiError::Internal => internal(),
        }
    }
}

fn internal() -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into())
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            tracing::error!("request failed: {:?}", self);
        } else {
            tracing::warn!(%status, "request rejected: {}", message);
        }
        (status, Json(ErrorRes { message })).into_response()
    }
}
