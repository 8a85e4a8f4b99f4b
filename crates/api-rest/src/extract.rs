//! Extractors whose rejections answer in the API's error shape.

use crate::error::ApiError;
use axum::extract::FromRequest;

/// `axum::Json` whose malformed or mistyped bodies become a 400 `{message}`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub(crate) struct JsonBody<T>(pub T);
