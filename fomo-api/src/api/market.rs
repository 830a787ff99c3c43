//! Market data endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use super::auth::RequireAdmin;
use crate::error::{ApiError, ApiResult};
use crate::market::{MarketSnapshot, PriceFeed, ProviderError};
use crate::AppState;

/// GET /api/crypto-market-data
pub async fn market_data(State(state): State<AppState>) -> Json<MarketSnapshot> {
    Json(state.market.get().await)
}

/// POST /api/crypto-market-data/refresh
pub async fn refresh_market_data(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Json<MarketSnapshot> {
    Json(state.market.force_refresh().await)
}

/// GET /api/crypto-prices
pub async fn crypto_prices(State(state): State<AppState>) -> ApiResult<Json<PriceFeed>> {
    state.prices.get().await.map(Json).map_err(upstream_error)
}

fn upstream_error(e: ProviderError) -> ApiError {
    let status = match e {
        ProviderError::Status(429) => StatusCode::TOO_MANY_REQUESTS,
        ProviderError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    };
    ApiError::Upstream {
        status,
        message: format!("Price provider unavailable and no cached data: {}", e),
    }
}

pub fn market_routes() -> Router<AppState> {
    Router::new()
        .route("/api/crypto-market-data", get(market_data))
        .route("/api/crypto-market-data/refresh", post(refresh_market_data))
        .route("/api/crypto-prices", get(crypto_prices))
}
