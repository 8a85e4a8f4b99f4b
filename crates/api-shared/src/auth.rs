//! Bearer tokens identifying the tenant behind a request.
//!
//! Tokens are HS256 JWTs whose `sub` claim is the tenant id in canonical hyphenated form.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use panel_uuid::TenantId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Unauthorized")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("token signing failed")]
    Signing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Tenant id
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// The tenant named by `sub`; non-canonical ids are rejected.
    pub fn tenant(&self) -> Result<TenantId, AuthError> {
        TenantId::parse(&self.sub).map_err(|_| AuthError::InvalidToken)
    }
}

/// Issues and verifies tenant bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    secret: Arc<String>,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: impl Into<String>, ttl_days: i64) -> Self {
        Self {
            secret: Arc::new(secret.into()),
            ttl: Duration::days(ttl_days),
        }
    }

    pub fn issue(&self, tenant: &TenantId, email: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: tenant.to_string(),
            email: email.to_owned(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            tracing::error!("failed to encode token: {}", e);
            AuthError::Signing
        })
    }

    /// Validates signature and expiry, returning the decoded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let key = DecodingKey::from_secret(self.secret.as_bytes());
        decode::<Claims>(token, &key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("token validation failed: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken,
                }
            })
    }

    /// Parses an `Authorization` header value of the form `Bearer <token>`.
    pub fn authenticate(&self, header: Option<&str>) -> Result<TenantId, AuthError> {
        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;
        self.verify(token)?.tenant()
    }
}
