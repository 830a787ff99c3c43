//! Integration tests for the market data fallback chain and providers

mod helpers;

use axum::http::StatusCode;
use fomo_api::market::providers::http_client;
use fomo_api::market::{
    AlternativeMe, Binance, CoinGecko, MarketService, PriceTicker, QuoteProvider, SentimentProvider,
};
use fomo_api::AppState;
use fomo_api::auth::AdminAuth;
use fomo_common::db::{init_memory_database, DocumentStore};
use helpers::*;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tower::util::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOUR: Duration = Duration::from_secs(3600);

async fn memory_store() -> DocumentStore {
    DocumentStore::new(init_memory_database().await.unwrap())
}

// =============================================================================
// Fallback chain
// =============================================================================

#[tokio::test]
async fn test_fresh_cache_is_served_without_provider_calls() {
    let store = memory_store().await;
    let (provider, calls) = CountingProvider::succeeding(97_000.0);
    let service = market_service(store, vec![Box::new(provider)], HOUR);

    let first = service.get().await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!first.from_cache);
    assert_eq!(first.source, "counting");
    assert_eq!(first.cryptos[0].price, 97_000.0);

    let second = service.get().await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(second.from_cache);
    assert_eq!(second.cryptos, first.cryptos);
    assert_eq!(second.last_updated, first.last_updated);
}

#[tokio::test]
async fn test_stale_cache_served_when_every_provider_fails() {
    let store = memory_store().await;
    let (good, _) = CountingProvider::succeeding(95_000.0);
    market_service(store.clone(), vec![Box::new(good)], HOUR).get().await;

    let (bad_a, calls_a) = CountingProvider::failing();
    let (bad_b, calls_b) = CountingProvider::failing();
    let service = market_service(store, vec![Box::new(bad_a), Box::new(bad_b)], Duration::ZERO);

    let snapshot = service.get().await;
    assert_eq!(calls_a.load(Ordering::SeqCst), 1);
    assert_eq!(calls_b.load(Ordering::SeqCst), 1);
    assert!(snapshot.from_cache);
    assert!(!snapshot.is_fallback);
    assert_eq!(snapshot.cryptos[0].price, 95_000.0);
    assert!(snapshot.cache_error.as_deref().is_some_and(|e| e.contains("All price providers failed")));
}

#[tokio::test]
async fn test_second_provider_used_when_first_fails() {
    let store = memory_store().await;
    let (bad, bad_calls) = CountingProvider::failing();
    let (good, good_calls) = CountingProvider::succeeding(96_500.0);
    let service = market_service(store, vec![Box::new(bad), Box::new(good)], HOUR);

    let snapshot = service.get().await;
    assert_eq!(bad_calls.load(Ordering::SeqCst), 1);
    assert_eq!(good_calls.load(Ordering::SeqCst), 1);
    assert_eq!(snapshot.cryptos[0].price, 96_500.0);
    assert!(snapshot.cache_error.is_none());
}

#[tokio::test]
async fn test_forced_reset_triggers_exactly_one_refresh() {
    let store = memory_store().await;
    let (provider, calls) = CountingProvider::succeeding(97_000.0);
    let service = market_service(store, vec![Box::new(provider)], HOUR);

    service.get().await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let refreshed = service.force_refresh().await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(!refreshed.from_cache);

    let after = service.get().await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(after.from_cache);
}

#[tokio::test]
async fn test_static_fallback_when_nothing_cached() {
    let store = memory_store().await;
    let (provider, _) = CountingProvider::failing();
    let service = market_service(store.clone(), vec![Box::new(provider)], HOUR);

    let snapshot = service.get().await;
    assert!(snapshot.is_fallback);
    assert_eq!(snapshot.source, "fallback");
    assert_eq!(snapshot.cryptos[0].price, 94_500.0);
    assert!(snapshot.cache_error.is_some());

    // The fallback is never persisted as if it were real data
    assert!(service.load_cached().await.is_none());
}

#[tokio::test]
async fn test_concurrent_stale_readers_refresh_once() {
    let store = memory_store().await;
    let (provider, calls) = CountingProvider::succeeding(97_000.0);
    let service = std::sync::Arc::new(market_service(store, vec![Box::new(provider)], HOUR));

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.get().await })
        })
        .collect();
    for reader in readers {
        reader.await.unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Providers against mock upstreams
// =============================================================================

#[tokio::test]
async fn test_coingecko_quotes_and_global_metrics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .and(query_param("ids", "bitcoin,ethereum,zksync"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bitcoin": {"usd": 98_000.0, "usd_24h_change": 2.5},
            "ethereum": {"usd": 3_500.0, "usd_24h_change": -1.0}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/global"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "market_cap_percentage": {"btc": 61.2},
                "total_market_cap": {"usd": 3.4e12}
            }
        })))
        .mount(&server)
        .await;

    let provider = CoinGecko::new(http_client(Duration::from_secs(5)).unwrap(), server.uri());
    let quotes = provider.fetch_quotes().await.unwrap();

    assert_eq!(quotes.btc.unwrap().price, 98_000.0);
    assert_eq!(quotes.eth.unwrap().change_24h, -1.0);
    assert!(quotes.zk.is_none());
    assert_eq!(quotes.btc_dominance, Some(61.2));
    assert_eq!(quotes.total_market_cap, Some(3.4e12));
}

#[tokio::test]
async fn test_coingecko_rate_limit_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let provider = CoinGecko::new(http_client(Duration::from_secs(5)).unwrap(), server.uri());
    assert!(provider.fetch_quotes().await.is_err());
}

#[tokio::test]
async fn test_binance_string_prices_with_optional_altcoins() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ticker/24hr"))
        .and(query_param("symbol", "BTCUSDT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "symbol": "BTCUSDT",
            "lastPrice": "97123.45000000",
            "priceChangePercent": "-0.750"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ticker/24hr"))
        .and(query_param("symbol", "ETHUSDT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lastPrice": "3400.10",
            "priceChangePercent": "1.5"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ticker/24hr"))
        .and(query_param("symbol", "ZKUSDT"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let provider = Binance::new(http_client(Duration::from_secs(5)).unwrap(), server.uri());
    let quotes = provider.fetch_quotes().await.unwrap();

    assert_eq!(quotes.btc.unwrap().price, 97_123.45);
    assert_eq!(quotes.btc.unwrap().change_24h, -0.75);
    assert_eq!(quotes.eth.unwrap().price, 3_400.10);
    assert!(quotes.zk.is_none());
}

#[tokio::test]
async fn test_alternative_me_fear_greed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fng/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Fear and Greed Index",
            "data": [{"value": "73", "value_classification": "Greed"}]
        })))
        .mount(&server)
        .await;

    let provider = AlternativeMe::new(http_client(Duration::from_secs(5)).unwrap(), server.uri());
    assert_eq!(provider.fear_greed().await.unwrap(), 73);
}

// =============================================================================
// HTTP endpoints
// =============================================================================

async fn state_with_prices(prices: PriceTicker) -> AppState {
    let pool = init_memory_database().await.unwrap();
    let store = DocumentStore::new(pool.clone());
    let (provider, _) = CountingProvider::failing();
    AppState::new(
        pool,
        AdminAuth::new(TEST_PASSWORD, TEST_SECRET, HOUR),
        market_service(store, vec![Box::new(provider)], HOUR),
        prices,
    )
}

#[tokio::test]
async fn test_market_data_endpoint_never_errors() {
    let app = setup_app(test_state().await);

    let response = app.oneshot(test_request("GET", "/api/crypto-market-data")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["is_fallback"], true);
    assert_eq!(body["cryptos"][0]["symbol"], "BTC");
    assert_eq!(body["indices"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_crypto_prices_rate_limited_without_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let app = setup_app(state_with_prices(price_ticker(&server.uri())).await);
    let response = app.oneshot(test_request("GET", "/api/crypto-prices")).await.unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn test_crypto_prices_served_from_cache_after_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bitcoin": {"usd": 97_000.0, "usd_24h_change": 1.0, "usd_market_cap": 1.9e12}
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    // Zero TTL: every read goes upstream
    let client = http_client(Duration::from_secs(5)).unwrap();
    let ticker = PriceTicker::new(CoinGecko::new(client, server.uri()), Duration::ZERO);

    let first = ticker.get().await.unwrap();
    assert!(!first.cached);
    assert_eq!(first.prices["bitcoin"]["usd"], 97_000.0);

    let second = ticker.get().await.unwrap();
    assert!(second.cached);
    assert_eq!(second.rate_limited, Some(true));
    assert_eq!(second.prices, first.prices);
    assert!(second.error.is_some());
}

#[tokio::test]
async fn test_refresh_endpoint_requires_admin_and_returns_snapshot() {
    let app = setup_app(test_state().await);
    let token = login_token(&app).await;

    let response = app
        .oneshot(authed_request("POST", "/api/crypto-market-data/refresh", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert!(body["cryptos"].is_array());
}

#[allow(dead_code)]
fn assert_market_service_is_send_sync() {
    fn check<T: Send + Sync>() {}
    check::<MarketService>();
}
