use crate::{error::ApiError, AppState};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use panel_core::TenantId;

/// Tenant authenticated by the request's bearer token.
#[derive(Debug, Clone, Copy)]
pub struct Tenant(pub TenantId);

#[axum::async_trait]
impl FromRequestParts<AppState> for Tenant {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());
        let tenant = state.tokens.authenticate(header)?;
        Ok(Tenant(tenant))
    }
}
