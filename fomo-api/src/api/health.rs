//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response with build identification
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub git_hash: String,
    pub build_timestamp: String,
    pub uptime_secs: u64,
}

/// GET /api/health
///
/// Does not touch the database or external providers.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "fomo-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
        uptime_secs: state.startup_time.elapsed().as_secs(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/api/health", get(health_check))
}
