//! Price-only feed with a short in-memory cache
//!
//! Unlike the market snapshot this feed has a single upstream (CoinGecko) and
//! no static fallback: without any cached prices an upstream failure surfaces
//! as an error.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use super::cache::{CacheEntry, StalenessPolicy};
use super::providers::{CoinGecko, ProviderError};

/// Coins listed by the price feed
pub const PRICE_IDS: &str =
    "bitcoin,ethereum,zksync,binancecoin,ripple,cardano,dogecoin,polkadot,avalanche-2,chainlink";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceFeed {
    /// Raw CoinGecko `simple/price` object
    pub prices: Value,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_age_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limited: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct PriceTicker {
    source: CoinGecko,
    policy: StalenessPolicy,
    cache: RwLock<Option<CacheEntry<Value>>>,
    refresh_lock: Mutex<()>,
}

impl PriceTicker {
    pub fn new(source: CoinGecko, ttl: Duration) -> Self {
        Self {
            source,
            policy: StalenessPolicy::new(ttl),
            cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Current prices; errors only when upstream fails and nothing is cached
    pub async fn get(&self) -> Result<PriceFeed, ProviderError> {
        if let Some(feed) = self.fresh_cached().await {
            return Ok(feed);
        }

        let _guard = self.refresh_lock.lock().await;
        if let Some(feed) = self.fresh_cached().await {
            return Ok(feed);
        }

        let now = Utc::now();
        match self.source.simple_price(PRICE_IDS, true).await {
            Ok(prices) => {
                *self.cache.write().await = Some(CacheEntry::new(prices.clone(), now));
                Ok(PriceFeed {
                    prices,
                    cached: false,
                    cache_age_seconds: None,
                    last_updated: Some(now.to_rfc3339()),
                    rate_limited: None,
                    error: None,
                })
            }
            Err(e) => {
                let cache = self.cache.read().await;
                let Some(entry) = cache.as_ref() else {
                    warn!("Price feed unavailable and nothing cached: {}", e);
                    return Err(e);
                };

                warn!("Price feed refresh failed, serving cached prices: {}", e);
                let rate_limited = matches!(e, ProviderError::Status(429));
                Ok(PriceFeed {
                    prices: entry.value().clone(),
                    cached: true,
                    cache_age_seconds: Some(entry.age(now).as_secs()),
                    last_updated: Some(entry.fetched_at().to_rfc3339()),
                    rate_limited: rate_limited.then_some(true),
                    error: Some(format!("{}, returning cached data", e)),
                })
            }
        }
    }

    async fn fresh_cached(&self) -> Option<PriceFeed> {
        let now = Utc::now();
        let cache = self.cache.read().await;
        let entry = cache.as_ref().filter(|entry| entry.is_fresh(&self.policy, now))?;

        debug!("Serving cached prices");
        Some(PriceFeed {
            prices: entry.value().clone(),
            cached: true,
            cache_age_seconds: Some(entry.age(now).as_secs()),
            last_updated: None,
            rate_limited: None,
            error: None,
        })
    }
}
