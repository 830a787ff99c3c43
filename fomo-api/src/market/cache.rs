//! Staleness bookkeeping for cached upstream data

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Maximum age before cached data must be refetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessPolicy {
    max_age: Duration,
}

impl StalenessPolicy {
    pub fn new(max_age: Duration) -> Self {
        Self { max_age }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Age of data stamped at `updated_at_secs` (Unix seconds); future stamps count as zero
    pub fn age(&self, updated_at_secs: f64, now: DateTime<Utc>) -> Duration {
        let now_secs = now.timestamp_millis() as f64 / 1000.0;
        let age = now_secs - updated_at_secs;
        if age.is_finite() && age > 0.0 {
            Duration::from_secs_f64(age)
        } else {
            Duration::ZERO
        }
    }

    pub fn is_fresh(&self, updated_at_secs: f64, now: DateTime<Utc>) -> bool {
        updated_at_secs > 0.0 && self.age(updated_at_secs, now) < self.max_age
    }
}

/// A value held in memory together with the time it was fetched
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    value: T,
    fetched_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, fetched_at: DateTime<Utc>) -> Self {
        Self { value, fetched_at }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.fetched_at).to_std().unwrap_or(Duration::ZERO)
    }

    pub fn is_fresh(&self, policy: &StalenessPolicy, now: DateTime<Utc>) -> bool {
        self.age(now) < policy.max_age()
    }
}
