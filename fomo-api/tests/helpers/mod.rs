//! Shared helpers for fomo-api integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use fomo_api::auth::AdminAuth;
use fomo_api::market::{
    providers::http_client, CoinGecko, CoinQuote, MarketService, PriceTicker, ProviderError,
    QuoteProvider, Quotes, StalenessPolicy,
};
use fomo_api::{build_router, AppState};
use fomo_common::db::{init_memory_database, DocumentStore};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

pub const TEST_PASSWORD: &str = "correct-horse";
pub const TEST_SECRET: &[u8] = b"integration-test-secret";

/// Quote provider returning a fixed BTC price, or failing, and counting calls
pub struct CountingProvider {
    pub calls: Arc<AtomicUsize>,
    pub btc_price: Option<f64>,
}

impl CountingProvider {
    pub fn succeeding(btc_price: f64) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: calls.clone(),
                btc_price: Some(btc_price),
            },
            calls,
        )
    }

    pub fn failing() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: calls.clone(),
                btc_price: None,
            },
            calls,
        )
    }
}

#[async_trait]
impl QuoteProvider for CountingProvider {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn fetch_quotes(&self) -> Result<Quotes, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.btc_price {
            Some(price) => Ok(Quotes {
                btc: Some(CoinQuote::new(price, 1.0)),
                ..Default::default()
            }),
            None => Err(ProviderError::Status(503)),
        }
    }
}

/// Market service over `store` with the given providers and TTL
pub fn market_service(
    store: DocumentStore,
    providers: Vec<Box<dyn QuoteProvider>>,
    ttl: Duration,
) -> MarketService {
    MarketService::new(store, providers, None, StalenessPolicy::new(ttl))
}

/// Price ticker pointed at `base_url` (a wiremock server, or an unroutable address)
pub fn price_ticker(base_url: &str) -> PriceTicker {
    let client = http_client(Duration::from_secs(2)).expect("http client");
    PriceTicker::new(CoinGecko::new(client, base_url), Duration::from_secs(300))
}

/// State over a fresh in-memory database; market providers always fail
pub async fn test_state() -> AppState {
    let pool = init_memory_database().await.expect("in-memory database");
    let store = DocumentStore::new(pool.clone());
    let (provider, _) = CountingProvider::failing();
    let market = market_service(store, vec![Box::new(provider)], Duration::from_secs(3600));

    AppState::new(
        pool,
        AdminAuth::new(TEST_PASSWORD, TEST_SECRET, Duration::from_secs(3600)),
        market,
        price_ticker("http://127.0.0.1:9"),
    )
}

pub fn setup_app(state: AppState) -> Router {
    build_router(state, &["*".to_string()])
}

pub fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn authed_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Log in through the API and return the token
pub async fn login_token(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/login",
            &serde_json::json!({"password": TEST_PASSWORD}),
            None,
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    body["token"].as_str().expect("token").to_string()
}
