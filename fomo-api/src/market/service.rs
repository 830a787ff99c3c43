//! Cached market snapshot with a provider fallback chain
//!
//! Read path:
//! 1. Fresh cached snapshot → served as is, marked `from_cache`
//! 2. Otherwise one refresh (serialised by a mutex) walks the quote providers
//!    in order and persists the first success, even a partial one
//! 3. Every provider failed → last cached snapshot of any age, with `cache_error`
//! 4. Nothing ever cached → hardcoded static snapshot with `is_fallback`

use chrono::{DateTime, Utc};
use fomo_common::config::MarketSettings;
use fomo_common::db::{Document, DocumentStore};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::cache::StalenessPolicy;
use super::providers::{
    http_client, AlternativeMe, Binance, CoinGecko, CryptoCompare, ProviderError, QuoteProvider,
    SentimentProvider,
};
use super::snapshot::{round_to, MarketSnapshot};

/// Collection holding the cached snapshot
pub const CACHE_COLLECTION: &str = "crypto_cache";
/// Well-known id of the cached snapshot document
pub const MARKET_DATA_KEY: &str = "market_data";

/// Base URLs of the external providers
#[derive(Debug, Clone)]
pub struct ProviderUrls {
    pub coingecko: String,
    pub binance: String,
    pub cryptocompare: String,
    pub alternative_me: String,
}

impl Default for ProviderUrls {
    fn default() -> Self {
        Self {
            coingecko: CoinGecko::BASE_URL.to_string(),
            binance: Binance::BASE_URL.to_string(),
            cryptocompare: CryptoCompare::BASE_URL.to_string(),
            alternative_me: AlternativeMe::BASE_URL.to_string(),
        }
    }
}

pub struct MarketService {
    store: DocumentStore,
    providers: Vec<Box<dyn QuoteProvider>>,
    sentiment: Option<Box<dyn SentimentProvider>>,
    policy: StalenessPolicy,
    refresh_lock: Mutex<()>,
}

impl MarketService {
    pub fn new(
        store: DocumentStore,
        providers: Vec<Box<dyn QuoteProvider>>,
        sentiment: Option<Box<dyn SentimentProvider>>,
        policy: StalenessPolicy,
    ) -> Self {
        Self {
            store,
            providers,
            sentiment,
            policy,
            refresh_lock: Mutex::new(()),
        }
    }

    /// CoinGecko → Binance → CryptoCompare, Fear & Greed from alternative.me
    pub fn with_default_providers(
        store: DocumentStore,
        settings: &MarketSettings,
        urls: &ProviderUrls,
    ) -> Result<Self, ProviderError> {
        let client = http_client(settings.request_timeout)?;
        let providers: Vec<Box<dyn QuoteProvider>> = vec![
            Box::new(CoinGecko::new(client.clone(), urls.coingecko.clone())),
            Box::new(Binance::new(client.clone(), urls.binance.clone())),
            Box::new(CryptoCompare::new(client.clone(), urls.cryptocompare.clone())),
        ];
        let sentiment: Box<dyn SentimentProvider> =
            Box::new(AlternativeMe::new(client, urls.alternative_me.clone()));

        Ok(Self::new(
            store,
            providers,
            Some(sentiment),
            StalenessPolicy::new(settings.market_ttl),
        ))
    }

    /// Current market snapshot; always produces a payload
    pub async fn get(&self) -> MarketSnapshot {
        let now = Utc::now();
        let cached = self.load_cached().await;

        if let Some(snapshot) = cached.as_ref() {
            if self.policy.is_fresh(snapshot.last_updated_timestamp, now) {
                debug!("Serving cached market data");
                return as_cached(snapshot.clone(), now);
            }
        }

        let _guard = self.refresh_lock.lock().await;

        // Another request may have refreshed while this one waited
        let cached = self.load_cached().await;
        let now = Utc::now();
        if let Some(snapshot) = cached.as_ref() {
            if self.policy.is_fresh(snapshot.last_updated_timestamp, now) {
                return as_cached(snapshot.clone(), now);
            }
        }

        match self.refresh(now).await {
            Ok(snapshot) => snapshot,
            Err(reason) => match cached {
                Some(snapshot) => {
                    warn!("Serving stale market data: {}", reason);
                    let mut stale = as_cached(snapshot, now);
                    stale.cache_error = Some(reason);
                    stale
                }
                None => {
                    error!("No market data available, serving static fallback: {}", reason);
                    MarketSnapshot::static_fallback(now, reason)
                }
            },
        }
    }

    /// Expire the cached snapshot, then read again
    pub async fn force_refresh(&self) -> MarketSnapshot {
        let mut patch = Document::new();
        patch.insert("last_updated_timestamp".to_string(), Value::from(0));

        match self.store.merge(CACHE_COLLECTION, MARKET_DATA_KEY, patch).await {
            Ok(Some(_)) => info!("Market data cache expired on request"),
            Ok(None) => debug!("No market data cached yet"),
            Err(e) => warn!("Failed to expire market data cache: {}", e),
        }

        self.get().await
    }

    /// Stored snapshot, if any; unreadable documents count as missing
    pub async fn load_cached(&self) -> Option<MarketSnapshot> {
        let doc = match self.store.get(CACHE_COLLECTION, MARKET_DATA_KEY).await {
            Ok(doc) => doc?,
            Err(e) => {
                warn!("Failed to read market data cache: {}", e);
                return None;
            }
        };

        match serde_json::from_value::<MarketSnapshot>(Value::Object(doc)) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("Discarding unreadable market data cache: {}", e);
                None
            }
        }
    }

    /// Walk the providers; on success persist and return the new snapshot
    async fn refresh(&self, now: DateTime<Utc>) -> Result<MarketSnapshot, String> {
        info!("Fetching fresh market data");

        let mut failures = Vec::with_capacity(self.providers.len());
        let mut fetched = None;
        for provider in &self.providers {
            match provider.fetch_quotes().await {
                Ok(quotes) => {
                    info!("Market prices fetched from {}", provider.name());
                    fetched = Some((quotes, provider.name()));
                    break;
                }
                Err(e) => {
                    warn!("{} failed: {}", provider.name(), e);
                    failures.push(format!("{}: {}", provider.name(), e));
                }
            }
        }

        let Some((quotes, source)) = fetched else {
            return Err(format!("All price providers failed ({})", failures.join("; ")));
        };

        let fear_greed = match &self.sentiment {
            Some(sentiment) => match sentiment.fear_greed().await {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Fear & Greed index unavailable: {}", e);
                    None
                }
            },
            None => None,
        };

        let snapshot = MarketSnapshot::build(&quotes, fear_greed, source, now);
        self.store_snapshot(&snapshot).await;
        Ok(snapshot)
    }

    async fn store_snapshot(&self, snapshot: &MarketSnapshot) {
        let mut doc = match serde_json::to_value(snapshot) {
            Ok(Value::Object(doc)) => doc,
            Ok(_) => return,
            Err(e) => {
                error!("Failed to serialise market data: {}", e);
                return;
            }
        };
        doc.insert("id".to_string(), Value::String(MARKET_DATA_KEY.to_string()));

        if let Err(e) = self.store.upsert(CACHE_COLLECTION, doc).await {
            error!("Failed to cache market data: {}", e);
        }
    }
}

/// Mark a stored snapshot as served from cache with its age in minutes
fn as_cached(mut snapshot: MarketSnapshot, now: DateTime<Utc>) -> MarketSnapshot {
    // Age comes from the RFC 3339 stamp; the numeric one may have been reset
    let age_minutes = DateTime::parse_from_rfc3339(&snapshot.last_updated)
        .map(|at| (now - at.with_timezone(&Utc)).num_milliseconds().max(0) as f64 / 60_000.0)
        .unwrap_or(0.0);

    snapshot.from_cache = true;
    snapshot.cache_age_minutes = round_to(age_minutes, 1);
    snapshot
}
