//! Admin login/verify endpoints and the admin guard extractor

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::auth::{AdminClaims, AuthError};
use crate::error::ApiError;
use crate::AppState;

/// Handler argument that only extracts for requests carrying a valid admin token
///
/// Expects `Authorization: Bearer <token>`; anything else is rejected with 401.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AdminClaims);

#[async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Expected a Bearer token".to_string()))?;

        state.auth.verify(token).map(RequireAdmin).map_err(|e| {
            warn!("Rejected admin request to {}: {}", parts.uri.path(), e);
            ApiError::Unauthorized(e.to_string())
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

/// POST /api/admin/login
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    match state.auth.login(&req.password) {
        Ok(issued) => {
            info!("Admin login succeeded");
            Json(json!({
                "success": true,
                "token": issued.token,
                "expires_at": issued.expires_at.to_rfc3339(),
                "message": "Login successful",
            }))
            .into_response()
        }
        Err(AuthError::InvalidPassword) => {
            warn!("Admin login failed: invalid password");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "success": false,
                    "message": "Invalid password",
                })),
            )
                .into_response()
        }
        Err(e) => ApiError::Internal(e.to_string()).into_response(),
    }
}

/// POST /api/admin/verify
pub async fn verify(State(state): State<AppState>, Json(req): Json<VerifyRequest>) -> Json<serde_json::Value> {
    let valid = state.auth.verify(&req.token).is_ok();
    Json(json!({ "valid": valid }))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/login", post(login))
        .route("/api/admin/verify", post(verify))
}
