//! HTTP API handlers for fomo-api

pub mod analytics;
pub mod auth;
pub mod content;
pub mod health;
pub mod market;
pub mod wallet;

pub use analytics::analytics_routes;
pub use auth::{auth_routes, RequireAdmin};
pub use content::content_routes;
pub use health::health_routes;
pub use market::market_routes;
pub use wallet::wallet_routes;
