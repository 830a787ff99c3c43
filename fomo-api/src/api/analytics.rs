//! Analytics endpoints
//!
//! Tracking is public (the landing page calls it); statistics and clearing
//! are admin-only.

use axum::{
    extract::{ConnectInfo, Query, State},
    http::{header::USER_AGENT, HeaderMap},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tracing::{debug, info};

use super::auth::RequireAdmin;
use crate::analytics::{aggregate, events, AnalyticsEvent, AnalyticsStats, TrackRequest};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub const DEFAULT_PERIOD_DAYS: i64 = 30;
pub const MAX_PERIOD_DAYS: i64 = 365;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub period: Option<i64>,
}

/// POST /api/analytics/track
pub async fn track(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(req): Json<TrackRequest>,
) -> ApiResult<Json<Value>> {
    if req.session_id.trim().is_empty() {
        return Err(ApiError::BadRequest("session_id is required".to_string()));
    }
    if req.event_type.trim().is_empty() {
        return Err(ApiError::BadRequest("event_type is required".to_string()));
    }
    if req.session_duration.is_some_and(|d| d < 0) {
        return Err(ApiError::BadRequest(
            "session_duration cannot be negative".to_string(),
        ));
    }

    let header_agent = headers.get(USER_AGENT).and_then(|v| v.to_str().ok());
    let ip = client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr));

    let event = AnalyticsEvent::from_request(req, header_agent, ip, Utc::now());
    let event = events::record_event(&state.db, event).await?;

    debug!(
        "Tracked {} for session {} ({}, {})",
        event.event_type, event.session_id, event.device_type, event.traffic_source
    );

    Ok(Json(json!({ "success": true, "event_id": event.id })))
}

/// GET /api/analytics/stats?period=<days>
pub async fn stats(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Json<AnalyticsStats>> {
    let period = query
        .period
        .unwrap_or(DEFAULT_PERIOD_DAYS)
        .clamp(1, MAX_PERIOD_DAYS);

    let end = Utc::now();
    let start = end - Duration::days(period);
    let events = events::events_between(&state.db, start, end).await?;

    Ok(Json(aggregate(&events)))
}

/// DELETE /api/analytics/clear
pub async fn clear(_admin: RequireAdmin, State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let deleted = events::clear_events(&state.db).await?;
    info!("Cleared {} analytics events", deleted);
    Ok(Json(json!({ "success": true, "deleted_count": deleted })))
}

/// First `X-Forwarded-For` hop, else the peer address
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/api/analytics/track", post(track))
        .route("/api/analytics/stats", get(stats))
        .route("/api/analytics/clear", delete(clear))
}
