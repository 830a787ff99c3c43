//! Error types for fomo-api
//!
//! Every handler error renders as `{"error": {"code": ..., "message": ...}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or invalid admin credential (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// External provider failed and nothing could stand in for it
    #[error("Upstream error: {message}")]
    Upstream { status: StatusCode, message: String },

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// fomo-common error
    #[error("Common error: {0}")]
    Common(#[from] fomo_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::Upstream { status, message } => (status, "UPSTREAM_ERROR", message),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg,
            ),
            ApiError::Other(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                err.to_string(),
            ),
            ApiError::Common(err) => match err {
                fomo_common::Error::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
                fomo_common::Error::InvalidInput(msg) => {
                    (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
                }
                other => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "COMMON_ERROR",
                    other.to_string(),
                ),
            },
        };

        if status.is_server_error() {
            tracing::error!(code = error_code, "{}", message);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
