//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use linechat_infra::line::SignatureError;

use crate::http::response::{ApiResponse, RequestMeta};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Webhook delivery failed signature verification.
    InvalidSignature(SignatureError),
    /// Authentication failure.
    Unauthorized(String),
    /// Malformed request.
    Validation(String),
}

impl From<SignatureError> for AppError {
    fn from(e: SignatureError) -> Self {
        AppError::InvalidSignature(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::InvalidSignature(e) => {
                (StatusCode::BAD_REQUEST, "INVALID_SIGNATURE", e.to_string())
            }
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        };

        let body = ApiResponse::error(code, &message, RequestMeta::start());
        (status, Json(body)).into_response()
    }
}
