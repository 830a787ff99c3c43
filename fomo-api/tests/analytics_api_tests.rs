//! Integration tests for analytics tracking and statistics

mod helpers;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use fomo_api::analytics::{DeviceType, TrafficSource};
use helpers::*;
use serde_json::json;
use tower::util::ServiceExt;

const CHROME_DESKTOP: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[tokio::test]
async fn test_pageviews_then_click_statistics() {
    let app = setup_app(test_state().await);
    let token = login_token(&app).await;

    for page in ["/", "/about", "/roadmap"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/analytics/track",
                &json!({
                    "session_id": "abc",
                    "event_type": "pageview",
                    "page_url": page,
                    "user_agent": CHROME_DESKTOP,
                    "referrer": "https://www.google.com/search?q=fomo"
                }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["success"], true);
        assert!(body["event_id"].is_string());
    }

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/analytics/track",
            &json!({
                "session_id": "abc",
                "event_type": "click",
                "button_id": "launch",
                "button_text": "Launch App",
                "user_agent": CHROME_DESKTOP
            }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(authed_request("GET", "/api/analytics/stats?period=7", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stats = extract_json(response.into_body()).await;
    assert_eq!(stats["unique_sessions"], 1);
    assert_eq!(stats["page_views"], 3);
    assert_eq!(stats["button_clicks"], 1);
    assert_eq!(stats["new_visitors"], 1);
    assert_eq!(stats["returning_visitors"], 2);
    assert_eq!(stats["desktop_visitors"], 4);
    assert_eq!(stats["desktop_percent"], 100.0);
    assert_eq!(stats["conversion_rate"], 0.0);
}

#[tokio::test]
async fn test_header_user_agent_used_when_payload_has_none() {
    let state = test_state().await;
    let db = state.db.clone();
    let app = setup_app(state);

    let request = Request::builder()
        .method("POST")
        .uri("/api/analytics/track")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::USER_AGENT, "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) Safari/604.1")
        .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
        .body(Body::from(json!({"session_id": "s1", "event_type": "pageview"}).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let start = chrono::Utc::now() - chrono::Duration::hours(1);
    let end = chrono::Utc::now() + chrono::Duration::hours(1);
    let events = fomo_api::analytics::events::events_between(&db, start, end).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].device_type, DeviceType::Tablet);
    assert_eq!(events[0].ip_address.as_deref(), Some("203.0.113.7"));
    assert_eq!(events[0].traffic_source, TrafficSource::Direct);
}

#[tokio::test]
async fn test_track_rejects_invalid_payloads() {
    let app = setup_app(test_state().await);

    let cases = [
        json!({"session_id": "", "event_type": "pageview"}),
        json!({"session_id": "abc", "event_type": " "}),
        json!({"session_id": "abc", "event_type": "pageview", "session_duration": -5}),
    ];
    for payload in cases {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/analytics/track", &payload, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", payload);
    }
}

#[tokio::test]
async fn test_stats_survive_huge_session_durations() {
    let app = setup_app(test_state().await);
    let token = login_token(&app).await;

    for session in ["long-1", "long-2"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/analytics/track",
                &json!({"session_id": session, "event_type": "pageview", "session_duration": i64::MAX}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(authed_request("GET", "/api/analytics/stats", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let stats = extract_json(response.into_body()).await;
    assert_eq!(stats["avg_session_duration"], i64::MAX);
}

#[tokio::test]
async fn test_clear_removes_all_events() {
    let app = setup_app(test_state().await);
    let token = login_token(&app).await;

    for session in ["a", "b"] {
        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/analytics/track",
                &json!({"session_id": session, "event_type": "pageview"}),
                None,
            ))
            .await
            .unwrap();
    }

    let response = app
        .clone()
        .oneshot(authed_request("DELETE", "/api/analytics/clear", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["deleted_count"], 2);

    let response = app
        .oneshot(authed_request("GET", "/api/analytics/stats", &token))
        .await
        .unwrap();
    let stats = extract_json(response.into_body()).await;
    assert_eq!(stats["page_views"], 0);
    assert_eq!(stats["unique_sessions"], 0);
    assert_eq!(stats["conversion_rate"], 0.0);
}
