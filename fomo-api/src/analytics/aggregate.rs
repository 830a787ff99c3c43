//! One-pass tabulation of analytics events into dashboard statistics

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use super::events::{AnalyticsEvent, EVENT_CLICK, EVENT_CONVERSION, EVENT_PAGEVIEW, UNKNOWN_LOCATION};
use super::ingest::{DeviceType, TrafficSource};

/// Length of the top-country/city/source lists
pub const TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedCount {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceShare {
    pub source: String,
    pub count: u64,
    pub percent: f64,
}

/// Dashboard statistics for one period
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyticsStats {
    pub page_views: u64,
    pub unique_sessions: u64,
    pub button_clicks: u64,
    pub conversions: u64,
    pub conversion_rate: f64,
    /// Seconds
    pub avg_session_duration: i64,

    pub new_visitors: u64,
    pub returning_visitors: u64,
    pub new_visitors_percent: f64,
    pub returning_visitors_percent: f64,

    pub desktop_visitors: u64,
    pub mobile_visitors: u64,
    pub tablet_visitors: u64,
    pub desktop_percent: f64,
    pub mobile_percent: f64,
    pub tablet_percent: f64,

    pub top_countries: Vec<NamedCount>,
    pub top_cities: Vec<NamedCount>,

    pub direct_traffic: u64,
    pub referral_traffic: u64,
    pub search_traffic: u64,
    pub direct_percent: f64,
    pub referral_percent: f64,
    pub search_percent: f64,
    pub detailed_sources: Vec<SourceShare>,
}

/// `part / whole * 100` rounded to two decimals; 0.0 when `whole` is 0
pub fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2(part as f64 / whole as f64 * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Tabulate `events`; an empty slice yields all zeros
pub fn aggregate(events: &[AnalyticsEvent]) -> AnalyticsStats {
    let mut stats = AnalyticsStats::default();

    let mut sessions: HashSet<&str> = HashSet::new();
    // Wide accumulator: durations come straight from public tracking requests
    let mut duration_sum: i128 = 0;
    let mut duration_count: i128 = 0;
    let mut countries: BTreeMap<&str, u64> = BTreeMap::new();
    let mut cities: BTreeMap<&str, u64> = BTreeMap::new();
    let mut source_details: BTreeMap<&str, u64> = BTreeMap::new();

    for event in events {
        if !event.session_id.is_empty() {
            sessions.insert(event.session_id.as_str());
        }

        match event.event_type.as_str() {
            EVENT_PAGEVIEW => {
                stats.page_views += 1;
                if event.is_new_visitor {
                    stats.new_visitors += 1;
                }
                if event.is_returning {
                    stats.returning_visitors += 1;
                }
            }
            EVENT_CLICK => stats.button_clicks += 1,
            EVENT_CONVERSION => stats.conversions += 1,
            _ => {}
        }

        if let Some(duration) = event.session_duration.filter(|d| *d > 0) {
            duration_sum += i128::from(duration);
            duration_count += 1;
        }

        match event.device_type {
            DeviceType::Desktop => stats.desktop_visitors += 1,
            DeviceType::Mobile => stats.mobile_visitors += 1,
            DeviceType::Tablet => stats.tablet_visitors += 1,
        }

        if event.country != UNKNOWN_LOCATION {
            *countries.entry(event.country.as_str()).or_default() += 1;
        }
        if event.city != UNKNOWN_LOCATION {
            *cities.entry(event.city.as_str()).or_default() += 1;
        }

        match event.traffic_source {
            TrafficSource::Direct => stats.direct_traffic += 1,
            TrafficSource::Referral => stats.referral_traffic += 1,
            TrafficSource::Search => stats.search_traffic += 1,
        }
        *source_details.entry(event.source_detail.as_str()).or_default() += 1;
    }

    stats.unique_sessions = sessions.len() as u64;
    stats.conversion_rate = percent(stats.conversions, stats.unique_sessions);

    if duration_count > 0 {
        // The mean of i64 values always fits back into i64
        stats.avg_session_duration = i64::try_from(duration_sum / duration_count).unwrap_or(i64::MAX);
    }

    let visitors = stats.new_visitors + stats.returning_visitors;
    stats.new_visitors_percent = percent(stats.new_visitors, visitors);
    stats.returning_visitors_percent = percent(stats.returning_visitors, visitors);

    // Every event carries exactly one device type and one traffic source
    let total = events.len() as u64;
    stats.desktop_percent = percent(stats.desktop_visitors, total);
    stats.mobile_percent = percent(stats.mobile_visitors, total);
    stats.tablet_percent = percent(stats.tablet_visitors, total);
    stats.direct_percent = percent(stats.direct_traffic, total);
    stats.referral_percent = percent(stats.referral_traffic, total);
    stats.search_percent = percent(stats.search_traffic, total);

    stats.top_countries = top_counts(countries);
    stats.top_cities = top_counts(cities);
    stats.detailed_sources = top_counts(source_details)
        .into_iter()
        .map(|entry| SourceShare {
            percent: percent(entry.count, total),
            source: entry.name,
            count: entry.count,
        })
        .collect();

    stats
}

/// Highest counts first; ties keep name order
fn top_counts(counts: BTreeMap<&str, u64>) -> Vec<NamedCount> {
    let mut entries: Vec<NamedCount> = counts
        .into_iter()
        .map(|(name, count)| NamedCount {
            name: name.to_string(),
            count,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(TOP_N);
    entries
}
