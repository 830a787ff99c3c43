//! Market snapshot served to the landing page ticker

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prices used when a coin could not be fetched
pub const FALLBACK_BTC: CoinQuote = CoinQuote { price: 94_500.0, change_24h: 1.5 };
pub const FALLBACK_ETH: CoinQuote = CoinQuote { price: 3_350.0, change_24h: 2.1 };
pub const FALLBACK_ZK: CoinQuote = CoinQuote { price: 0.18, change_24h: -0.5 };
pub const FALLBACK_BTC_DOMINANCE: f64 = 58.0;
pub const FALLBACK_TOTAL_MARKET_CAP: f64 = 3_200_000_000_000.0;
pub const FALLBACK_FEAR_GREED: i64 = 50;

/// Index values of the hardcoded payload served when nothing was ever cached
const STATIC_FEAR_GREED: f64 = 65.0;
const STATIC_ALTCOIN_SEASON: f64 = 42.0;

/// Source label for a snapshot built without any provider
pub const SOURCE_FALLBACK: &str = "fallback";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoinQuote {
    pub price: f64,
    /// Percent
    pub change_24h: f64,
}

impl CoinQuote {
    pub fn new(price: f64, change_24h: f64) -> Self {
        Self { price, change_24h }
    }

    /// A zero or negative price means the provider had no quote
    pub fn is_usable(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

/// Whatever one quote provider managed to return
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Quotes {
    pub btc: Option<CoinQuote>,
    pub eth: Option<CoinQuote>,
    pub zk: Option<CoinQuote>,
    /// Percent of total market cap
    pub btc_dominance: Option<f64>,
    /// USD
    pub total_market_cap: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoEntry {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change_24h: f64,
    pub formatted_price: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTotals {
    pub total_market_cap: f64,
    pub formatted_market_cap: String,
}

/// Cached market payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub cryptos: Vec<CryptoEntry>,
    pub indices: Vec<IndexEntry>,
    pub market: MarketTotals,
    /// RFC 3339
    pub last_updated: String,
    /// Unix seconds; 0 forces the next read to refresh
    pub last_updated_timestamp: f64,
    pub source: String,
    #[serde(default)]
    pub from_cache: bool,
    #[serde(default)]
    pub cache_age_minutes: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_error: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_fallback: bool,
}

impl MarketSnapshot {
    /// Assemble a snapshot, substituting constants for anything missing
    pub fn build(quotes: &Quotes, fear_greed: Option<i64>, source: &str, now: DateTime<Utc>) -> Self {
        let btc = usable_or(quotes.btc, FALLBACK_BTC);
        let eth = usable_or(quotes.eth, FALLBACK_ETH);
        let zk = usable_or(quotes.zk, FALLBACK_ZK);

        let btc_dominance = quotes
            .btc_dominance
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(FALLBACK_BTC_DOMINANCE);
        let total_market_cap = quotes
            .total_market_cap
            .filter(|c| c.is_finite() && *c > 0.0)
            .unwrap_or(FALLBACK_TOTAL_MARKET_CAP);
        let fear_greed = fear_greed.unwrap_or(FALLBACK_FEAR_GREED);

        Self {
            cryptos: vec![
                CryptoEntry {
                    symbol: "BTC".to_string(),
                    name: "Bitcoin".to_string(),
                    price: round_to(btc.price, 2),
                    change_24h: round_to(btc.change_24h, 2),
                    formatted_price: format_usd_whole(btc.price),
                },
                CryptoEntry {
                    symbol: "ETH".to_string(),
                    name: "Ethereum".to_string(),
                    price: round_to(eth.price, 2),
                    change_24h: round_to(eth.change_24h, 2),
                    formatted_price: format_usd_whole(eth.price),
                },
                CryptoEntry {
                    symbol: "ZKS".to_string(),
                    name: "zkSync".to_string(),
                    price: round_to(zk.price, 4),
                    change_24h: round_to(zk.change_24h, 2),
                    formatted_price: format!("${:.2}", zk.price),
                },
            ],
            indices: indices(
                fear_greed as f64,
                altcoin_season_index(btc_dominance) as f64,
                round_to(btc_dominance, 2),
            ),
            market: MarketTotals {
                total_market_cap: total_market_cap.round(),
                formatted_market_cap: format_market_cap(total_market_cap),
            },
            last_updated: now.to_rfc3339(),
            last_updated_timestamp: unix_seconds(now),
            source: source.to_string(),
            from_cache: false,
            cache_age_minutes: 0.0,
            cache_error: None,
            is_fallback: false,
        }
    }

    /// Hardcoded payload for when no provider answered and nothing was cached
    pub fn static_fallback(now: DateTime<Utc>, error: impl Into<String>) -> Self {
        let mut snapshot = Self::build(&Quotes::default(), None, SOURCE_FALLBACK, now);
        snapshot.indices = indices(
            STATIC_FEAR_GREED,
            STATIC_ALTCOIN_SEASON,
            FALLBACK_BTC_DOMINANCE,
        );
        snapshot.cache_error = Some(error.into());
        snapshot.is_fallback = true;
        snapshot
    }
}

fn indices(fear_greed: f64, altcoin_season: f64, btc_dominance: f64) -> Vec<IndexEntry> {
    vec![
        IndexEntry {
            name: "Fear & Greed".to_string(),
            value: fear_greed,
            label: "Index".to_string(),
        },
        IndexEntry {
            name: "Altcoin Season".to_string(),
            value: altcoin_season,
            label: "Index".to_string(),
        },
        IndexEntry {
            name: "BTC Dominance".to_string(),
            value: btc_dominance,
            label: "%".to_string(),
        },
    ]
}

fn usable_or(quote: Option<CoinQuote>, fallback: CoinQuote) -> CoinQuote {
    quote.filter(CoinQuote::is_usable).unwrap_or(fallback)
}

/// Altcoin season estimate from BTC dominance, clamped to 0..=100
pub fn altcoin_season_index(btc_dominance: f64) -> i64 {
    ((140.0 - btc_dominance * 2.1) as i64).clamp(0, 100)
}

pub fn unix_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64 / 1000.0
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// `$94,500`: whole dollars with thousands separators
pub fn format_usd_whole(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{}", rounded.abs() as u64);

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// `$3.20T` above one trillion, `$850.0B` otherwise
pub fn format_market_cap(value: f64) -> String {
    if value > 1_000_000_000_000.0 {
        format!("${:.2}T", value / 1_000_000_000_000.0)
    } else {
        format!("${:.1}B", value / 1_000_000_000.0)
    }
}
