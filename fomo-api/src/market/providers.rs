//! External market data providers
//!
//! Quote providers are tried in order by [`super::MarketService`]; each one
//! either returns usable quotes (at least a BTC price) or an error. The Fear &
//! Greed sentiment index is fetched from its own provider independently.

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::snapshot::{CoinQuote, Quotes};

/// CoinGecko ids shown in the market ticker
const TICKER_IDS: &str = "bitcoin,ethereum,zksync";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Http(String),

    #[error("unexpected response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else if let Some(status) = e.status() {
            ProviderError::Status(status.as_u16())
        } else if e.is_decode() {
            ProviderError::Parse(e.to_string())
        } else {
            ProviderError::Http(e.to_string())
        }
    }
}

/// A source of coin prices
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Label stored as the snapshot `source`
    fn name(&self) -> &'static str;

    async fn fetch_quotes(&self) -> Result<Quotes, ProviderError>;
}

/// A source of the Fear & Greed index (0..=100)
#[async_trait]
pub trait SentimentProvider: Send + Sync {
    async fn fear_greed(&self) -> Result<i64, ProviderError>;
}

/// Shared HTTP client with a per-request timeout
pub fn http_client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("fomo-api/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ProviderError::Http(e.to_string()))
}

async fn get_json(client: &Client, url: &str, query: &[(&str, &str)]) -> Result<Value, ProviderError> {
    let response = client
        .get(url)
        .query(query)
        .header(ACCEPT, "application/json")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status(status.as_u16()));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| ProviderError::Parse(e.to_string()))
}

/// Numbers may arrive as JSON numbers or numeric strings
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn require_btc(quotes: Quotes, provider: &str) -> Result<Quotes, ProviderError> {
    if quotes.btc.is_some_and(|q| q.is_usable()) {
        Ok(quotes)
    } else {
        Err(ProviderError::Parse(format!("{} returned no BTC price", provider)))
    }
}

// ========================================
// CoinGecko
// ========================================

pub struct CoinGecko {
    client: Client,
    base_url: String,
}

impl CoinGecko {
    pub const BASE_URL: &'static str = "https://api.coingecko.com/api/v3";

    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Raw `simple/price` response for comma-separated coin ids
    pub async fn simple_price(&self, ids: &str, include_market_cap: bool) -> Result<Value, ProviderError> {
        let mut query = vec![
            ("ids", ids),
            ("vs_currencies", "usd"),
            ("include_24hr_change", "true"),
        ];
        if include_market_cap {
            query.push(("include_market_cap", "true"));
        }

        let url = format!("{}/simple/price", self.base_url);
        get_json(&self.client, &url, &query).await
    }

    /// BTC dominance and total market cap from `/global`
    async fn global_metrics(&self) -> Result<(Option<f64>, Option<f64>), ProviderError> {
        let url = format!("{}/global", self.base_url);
        let body = get_json(&self.client, &url, &[]).await?;
        let data = &body["data"];
        Ok((
            number(&data["market_cap_percentage"]["btc"]),
            number(&data["total_market_cap"]["usd"]),
        ))
    }
}

fn gecko_quote(prices: &Value, id: &str) -> Option<CoinQuote> {
    let coin = prices.get(id)?;
    let price = number(&coin["usd"])?;
    let change = number(&coin["usd_24h_change"]).unwrap_or(0.0);
    Some(CoinQuote::new(price, change))
}

#[async_trait]
impl QuoteProvider for CoinGecko {
    fn name(&self) -> &'static str {
        "coingecko"
    }

    async fn fetch_quotes(&self) -> Result<Quotes, ProviderError> {
        let prices = self.simple_price(TICKER_IDS, false).await?;

        let mut quotes = require_btc(
            Quotes {
                btc: gecko_quote(&prices, "bitcoin"),
                eth: gecko_quote(&prices, "ethereum"),
                zk: gecko_quote(&prices, "zksync"),
                ..Default::default()
            },
            self.name(),
        )?;

        // Global metrics are optional; constants stand in when unavailable
        match self.global_metrics().await {
            Ok((dominance, market_cap)) => {
                quotes.btc_dominance = dominance;
                quotes.total_market_cap = market_cap;
            }
            Err(e) => warn!("CoinGecko global metrics unavailable: {}", e),
        }

        Ok(quotes)
    }
}

// ========================================
// Binance
// ========================================

pub struct Binance {
    client: Client,
    base_url: String,
}

impl Binance {
    pub const BASE_URL: &'static str = "https://api.binance.com/api/v3";

    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn ticker(&self, symbol: &str) -> Result<CoinQuote, ProviderError> {
        let url = format!("{}/ticker/24hr", self.base_url);
        let body = get_json(&self.client, &url, &[("symbol", symbol)]).await?;

        let price = number(&body["lastPrice"])
            .ok_or_else(|| ProviderError::Parse(format!("{} has no lastPrice", symbol)))?;
        let change = number(&body["priceChangePercent"]).unwrap_or(0.0);
        Ok(CoinQuote::new(price, change))
    }

    async fn optional_ticker(&self, symbol: &str) -> Option<CoinQuote> {
        match self.ticker(symbol).await {
            Ok(quote) => Some(quote),
            Err(e) => {
                debug!("Binance {} unavailable: {}", symbol, e);
                None
            }
        }
    }
}

#[async_trait]
impl QuoteProvider for Binance {
    fn name(&self) -> &'static str {
        "binance"
    }

    async fn fetch_quotes(&self) -> Result<Quotes, ProviderError> {
        let btc = self.ticker("BTCUSDT").await?;
        let quotes = Quotes {
            btc: Some(btc),
            eth: self.optional_ticker("ETHUSDT").await,
            zk: self.optional_ticker("ZKUSDT").await,
            ..Default::default()
        };
        require_btc(quotes, self.name())
    }
}

// ========================================
// CryptoCompare
// ========================================

pub struct CryptoCompare {
    client: Client,
    base_url: String,
}

impl CryptoCompare {
    pub const BASE_URL: &'static str = "https://min-api.cryptocompare.com/data";

    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

fn compare_quote(raw: &Value, symbol: &str) -> Option<CoinQuote> {
    let usd = raw.get(symbol)?.get("USD")?;
    let price = number(&usd["PRICE"])?;
    let change = number(&usd["CHANGEPCT24HOUR"]).unwrap_or(0.0);
    Some(CoinQuote::new(price, change))
}

#[async_trait]
impl QuoteProvider for CryptoCompare {
    fn name(&self) -> &'static str {
        "cryptocompare"
    }

    async fn fetch_quotes(&self) -> Result<Quotes, ProviderError> {
        let url = format!("{}/pricemultifull", self.base_url);
        let body = get_json(&self.client, &url, &[("fsyms", "BTC,ETH,ZK"), ("tsyms", "USD")]).await?;

        let raw = body
            .get("RAW")
            .ok_or_else(|| ProviderError::Parse("missing RAW section".to_string()))?;

        require_btc(
            Quotes {
                btc: compare_quote(raw, "BTC"),
                eth: compare_quote(raw, "ETH"),
                zk: compare_quote(raw, "ZK"),
                ..Default::default()
            },
            self.name(),
        )
    }
}

// ========================================
// alternative.me Fear & Greed
// ========================================

pub struct AlternativeMe {
    client: Client,
    base_url: String,
}

impl AlternativeMe {
    pub const BASE_URL: &'static str = "https://api.alternative.me";

    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SentimentProvider for AlternativeMe {
    async fn fear_greed(&self) -> Result<i64, ProviderError> {
        let url = format!("{}/fng/", self.base_url);
        let body = get_json(&self.client, &url, &[("limit", "1")]).await?;

        number(&body["data"][0]["value"])
            .map(|v| (v as i64).clamp(0, 100))
            .ok_or_else(|| ProviderError::Parse("missing data[0].value".to_string()))
    }
}
