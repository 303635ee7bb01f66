//! Admin token authentication extractor.
//!
//! Extracts the token from:
//! - `Authorization: Bearer <token>` header
//! - `X-API-Key: <token>` header
//!
//! Both sides are SHA-256 hashed and compared in constant time. Without a
//! configured admin token every request is rejected.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use constant_time_eq::constant_time_eq;
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};

use crate::http::error::AppError;
use crate::state::AppState;

/// Authenticated admin request marker. Extracting this validates the token.
pub struct AdminAuth;

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.admin_token.as_deref() else {
            return Err(AppError::Unauthorized(
                "Admin API is disabled. Set ADMIN_TOKEN to enable it.".to_string(),
            ));
        };

        let provided = extract_token(parts)?;

        let expected_hash = Sha256::digest(expected.expose_secret().as_bytes());
        let provided_hash = Sha256::digest(provided.as_bytes());
        if constant_time_eq(&expected_hash, &provided_hash) {
            Ok(AdminAuth)
        } else {
            tracing::warn!(path = %parts.uri.path(), "Rejected admin request with invalid token");
            Err(AppError::Unauthorized("Invalid admin token.".to_string()))
        }
    }
}

/// Extract the token from request headers.
fn extract_token(parts: &Parts) -> Result<String, AppError> {
    if let Some(auth) = parts.headers.get("authorization") {
        let auth_str = auth.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid Authorization header encoding".to_string())
        })?;
        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return Ok(token.trim().to_string());
        }
    }

    if let Some(key) = parts.headers.get("x-api-key") {
        let key_str = key.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid X-API-Key header encoding".to_string())
        })?;
        return Ok(key_str.trim().to_string());
    }

    Err(AppError::Unauthorized(
        "Missing admin token. Provide via 'Authorization: Bearer <token>' or 'X-API-Key: <token>' header.".to_string(),
    ))
}
