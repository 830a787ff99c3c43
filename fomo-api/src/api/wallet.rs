//! Wallet registration endpoints
//!
//! Check, register and update are called by the site's wallet modal and are
//! public; unregistering is admin-only.

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::auth::RequireAdmin;
use crate::error::ApiResult;
use crate::wallet::{self, WalletRegistrationRequest, WalletStatus};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct WalletUpdateQuery {
    pub twitter_username: Option<String>,
}

/// GET /api/wallet/check/:address
pub async fn check(State(state): State<AppState>, Path(address): Path<String>) -> ApiResult<Json<WalletStatus>> {
    Ok(Json(wallet::check(&state.store, &address).await?))
}

/// POST /api/wallet/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<WalletRegistrationRequest>,
) -> ApiResult<Json<Value>> {
    let registration = wallet::register(&state.store, request).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Wallet registered successfully",
        "wallet_address": registration.wallet_address,
        "invite_code": registration.invite_code,
    })))
}

/// PUT /api/wallet/update/:address?twitter_username=
pub async fn update(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<WalletUpdateQuery>,
) -> ApiResult<Json<Value>> {
    wallet::update(&state.store, &address, query.twitter_username).await?;
    Ok(Json(json!({ "success": true, "message": "Registration updated" })))
}

/// DELETE /api/wallet/unregister/:address
pub async fn unregister(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<Json<Value>> {
    wallet::unregister(&state.store, &address).await?;
    Ok(Json(json!({ "success": true, "message": "Wallet unregistered successfully" })))
}

pub fn wallet_routes() -> Router<AppState> {
    Router::new()
        .route("/api/wallet/check/:address", get(check))
        .route("/api/wallet/register", post(register))
        .route("/api/wallet/update/:address", put(update))
        .route("/api/wallet/unregister/:address", delete(unregister))
}
