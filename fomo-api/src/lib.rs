//! fomo-api library - landing page CMS backend
//!
//! REST API under `/api` serving landing page content, visitor analytics and
//! cached cryptocurrency market data to the public site and its admin panel.

use axum::{http::HeaderValue, Router};
use fomo_common::db::DocumentStore;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod analytics;
pub mod api;
pub mod auth;
pub mod content;
pub mod error;
pub mod market;
pub mod seed;
pub mod wallet;

use auth::AdminAuth;
use market::{MarketService, PriceTicker};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Document collections on top of `db`
    pub store: DocumentStore,
    pub auth: Arc<AdminAuth>,
    pub market: Arc<MarketService>,
    pub prices: Arc<PriceTicker>,
    /// Server startup time, for uptime reporting
    pub startup_time: Instant,
}

impl AppState {
    pub fn new(db: SqlitePool, auth: AdminAuth, market: MarketService, prices: PriceTicker) -> Self {
        Self {
            store: DocumentStore::new(db.clone()),
            db,
            auth: Arc::new(auth),
            market: Arc::new(market),
            prices: Arc::new(prices),
            startup_time: Instant::now(),
        }
    }
}

/// CORS for the configured origins; `*` (or no origins) allows any
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build application router
///
/// Public reads and analytics tracking are open; every mutation requires an
/// admin token (see [`api::RequireAdmin`]).
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::auth_routes())
        .merge(api::analytics_routes())
        .merge(api::market_routes())
        .merge(api::content_routes())
        .merge(api::wallet_routes())
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
