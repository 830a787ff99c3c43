//! Visitor analytics: event ingestion, storage and aggregation

pub mod aggregate;
pub mod events;
pub mod ingest;

pub use aggregate::{aggregate, AnalyticsStats};
pub use events::{AnalyticsEvent, TrackRequest};
pub use ingest::{classify_referrer, parse_user_agent, DeviceType, TrafficSource};
