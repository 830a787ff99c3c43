//! Cryptocurrency market data: provider clients, caching and the served snapshot

pub mod cache;
pub mod prices;
pub mod providers;
pub mod service;
pub mod snapshot;

pub use cache::{CacheEntry, StalenessPolicy};
pub use prices::{PriceFeed, PriceTicker};
pub use providers::{
    AlternativeMe, Binance, CoinGecko, CryptoCompare, ProviderError, QuoteProvider, SentimentProvider,
};
pub use service::{MarketService, ProviderUrls};
pub use snapshot::{CoinQuote, MarketSnapshot, Quotes};
