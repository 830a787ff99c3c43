//! Analytics event rows
//!
//! Events are immutable facts: inserted once by `track`, read back for
//! aggregation, and only ever removed in bulk.

use chrono::{DateTime, TimeZone, Utc};
use fomo_common::Result;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use super::ingest::{classify_referrer, parse_user_agent, DeviceType, TrafficSource};

pub const EVENT_PAGEVIEW: &str = "pageview";
pub const EVENT_CLICK: &str = "click";
pub const EVENT_CONVERSION: &str = "conversion";

/// Geography placeholder until IP geolocation exists
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// Body of `POST /api/analytics/track`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackRequest {
    pub session_id: String,
    pub event_type: String,
    pub page_url: Option<String>,
    pub page_title: Option<String>,
    pub button_id: Option<String>,
    pub button_text: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    /// Seconds
    pub session_duration: Option<i64>,
    pub conversion_type: Option<String>,
    pub conversion_value: Option<f64>,
}

/// A stored analytics event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    pub id: String,
    pub session_id: String,
    pub event_type: String,
    pub page_url: Option<String>,
    pub page_title: Option<String>,
    pub button_id: Option<String>,
    pub button_text: Option<String>,
    pub user_agent: Option<String>,
    pub device_type: DeviceType,
    pub browser: String,
    pub os: String,
    pub country: String,
    pub city: String,
    pub ip_address: Option<String>,
    pub referrer: Option<String>,
    pub traffic_source: TrafficSource,
    pub source_detail: String,
    pub timestamp: DateTime<Utc>,
    pub session_duration: Option<i64>,
    pub is_new_visitor: bool,
    pub is_returning: bool,
    pub conversion_type: Option<String>,
    pub conversion_value: Option<f64>,
}

impl AnalyticsEvent {
    /// Build an event from a tracking request
    ///
    /// The payload's user agent wins over the request header. The event starts
    /// out as a new visitor; [`record_event`] settles the returning flag.
    pub fn from_request(
        req: TrackRequest,
        header_user_agent: Option<&str>,
        ip_address: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let user_agent = req
            .user_agent
            .filter(|ua| !ua.is_empty())
            .or_else(|| header_user_agent.map(str::to_string));
        let client = parse_user_agent(user_agent.as_deref().unwrap_or_default());
        let source = classify_referrer(req.referrer.as_deref());

        Self {
            id: Uuid::new_v4().to_string(),
            session_id: req.session_id,
            event_type: req.event_type,
            page_url: req.page_url,
            page_title: req.page_title,
            button_id: req.button_id,
            button_text: req.button_text,
            user_agent,
            device_type: client.device_type,
            browser: client.browser,
            os: client.os,
            country: UNKNOWN_LOCATION.to_string(),
            city: UNKNOWN_LOCATION.to_string(),
            ip_address,
            referrer: req.referrer,
            traffic_source: source.source,
            source_detail: source.detail,
            timestamp,
            session_duration: req.session_duration,
            is_new_visitor: true,
            is_returning: false,
            conversion_type: req.conversion_type,
            conversion_value: req.conversion_value,
        }
    }

    fn from_row(row: &SqliteRow) -> Result<Self> {
        let device_type: String = row.try_get("device_type")?;
        let traffic_source: String = row.try_get("traffic_source")?;
        let timestamp_ms: i64 = row.try_get("timestamp_ms")?;

        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            event_type: row.try_get("event_type")?,
            page_url: row.try_get("page_url")?,
            page_title: row.try_get("page_title")?,
            button_id: row.try_get("button_id")?,
            button_text: row.try_get("button_text")?,
            user_agent: row.try_get("user_agent")?,
            device_type: device_type.parse().unwrap_or(DeviceType::Desktop),
            browser: row.try_get("browser")?,
            os: row.try_get("os")?,
            country: row.try_get("country")?,
            city: row.try_get("city")?,
            ip_address: row.try_get("ip_address")?,
            referrer: row.try_get("referrer")?,
            traffic_source: traffic_source.parse().unwrap_or(TrafficSource::Direct),
            source_detail: row.try_get("source_detail")?,
            timestamp: Utc
                .timestamp_millis_opt(timestamp_ms)
                .single()
                .unwrap_or_default(),
            session_duration: row.try_get("session_duration")?,
            is_new_visitor: row.try_get::<i64, _>("is_new_visitor")? != 0,
            is_returning: row.try_get::<i64, _>("is_returning")? != 0,
            conversion_type: row.try_get("conversion_type")?,
            conversion_value: row.try_get("conversion_value")?,
        })
    }
}

/// True if the session already produced a pageview
pub async fn has_prior_pageview(pool: &SqlitePool, session_id: &str) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM analytics_events WHERE session_id = ? AND event_type = ? LIMIT 1",
    )
    .bind(session_id)
    .bind(EVENT_PAGEVIEW)
    .fetch_optional(pool)
    .await?;
    Ok(found.is_some())
}

/// Settle the visitor flags and store the event
///
/// The prior-pageview check and the insert are separate statements; two
/// simultaneous first pageviews of one session may both count as new.
pub async fn record_event(pool: &SqlitePool, mut event: AnalyticsEvent) -> Result<AnalyticsEvent> {
    if has_prior_pageview(pool, &event.session_id).await? {
        event.is_new_visitor = false;
        event.is_returning = true;
    }
    insert_event(pool, &event).await?;
    Ok(event)
}

pub async fn insert_event(pool: &SqlitePool, event: &AnalyticsEvent) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO analytics_events (
            id, session_id, event_type, page_url, page_title, button_id, button_text,
            user_agent, device_type, browser, os, country, city, ip_address,
            referrer, traffic_source, source_detail, timestamp_ms, session_duration,
            is_new_visitor, is_returning, conversion_type, conversion_value
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&event.id)
    .bind(&event.session_id)
    .bind(&event.event_type)
    .bind(&event.page_url)
    .bind(&event.page_title)
    .bind(&event.button_id)
    .bind(&event.button_text)
    .bind(&event.user_agent)
    .bind(event.device_type.as_str())
    .bind(&event.browser)
    .bind(&event.os)
    .bind(&event.country)
    .bind(&event.city)
    .bind(&event.ip_address)
    .bind(&event.referrer)
    .bind(event.traffic_source.as_str())
    .bind(&event.source_detail)
    .bind(event.timestamp.timestamp_millis())
    .bind(event.session_duration)
    .bind(i64::from(event.is_new_visitor))
    .bind(i64::from(event.is_returning))
    .bind(&event.conversion_type)
    .bind(event.conversion_value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Events with `start <= timestamp <= end`, oldest first
pub async fn events_between(
    pool: &SqlitePool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<AnalyticsEvent>> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM analytics_events
        WHERE timestamp_ms >= ? AND timestamp_ms <= ?
        ORDER BY timestamp_ms ASC
        "#,
    )
    .bind(start.timestamp_millis())
    .bind(end.timestamp_millis())
    .fetch_all(pool)
    .await?;

    rows.iter().map(AnalyticsEvent::from_row).collect()
}

/// Delete every event; returns the number removed
pub async fn clear_events(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM analytics_events")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
