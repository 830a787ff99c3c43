//! Integration tests for wallet registration

mod helpers;

use axum::http::StatusCode;
use helpers::*;
use serde_json::{json, Value};
use tower::util::ServiceExt;

async fn send(app: &axum::Router, request: axum::http::Request<axum::body::Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

#[tokio::test]
async fn test_wallet_registration_lifecycle() {
    let app = setup_app(test_state().await);
    let token = login_token(&app).await;

    let (status, body) = send(&app, test_request("GET", "/api/wallet/check/0xAbC")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_registered"], false);
    assert_eq!(body["wallet_address"], "0xabc");

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/wallet/register",
            &json!({"wallet_address": "0xABC", "invite_code": "fomo1"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["invite_code"], "FOMO1");

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/wallet/register",
            &json!({"wallet_address": "0xabc", "invite_code": "OTHER"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("already registered"));

    let (status, _) = send(
        &app,
        test_request("PUT", "/api/wallet/update/0xABC?twitter_username=fomo_fan"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, test_request("GET", "/api/wallet/check/0xabc")).await;
    assert_eq!(body["is_registered"], true);
    assert_eq!(body["invite_code"], "FOMO1");
    assert_eq!(body["twitter_username"], "fomo_fan");

    let (status, _) = send(&app, test_request("DELETE", "/api/wallet/unregister/0xabc")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, authed_request("DELETE", "/api/wallet/unregister/0xabc", &token)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, test_request("GET", "/api/wallet/check/0xabc")).await;
    assert_eq!(body["is_registered"], false);
}

#[tokio::test]
async fn test_unknown_wallet_update_and_unregister_are_not_found() {
    let app = setup_app(test_state().await);
    let token = login_token(&app).await;

    let (status, _) = send(&app, test_request("PUT", "/api/wallet/update/0xnone?twitter_username=x")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, authed_request("DELETE", "/api/wallet/unregister/0xnone", &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}
