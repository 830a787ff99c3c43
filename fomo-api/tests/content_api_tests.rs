//! Integration tests for list resources and singleton settings

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

// =============================================================================
// List resources
// =============================================================================

#[tokio::test]
async fn test_faq_crud_lifecycle() {
    let app = setup_app(test_state().await);
    let token = login_token(&app).await;

    let (status, created) = send(
        &app,
        json_request(
            "POST",
            "/api/faq",
            &json!({"question_en": "What is FOMO?", "question_ru": "Что такое FOMO?", "answer_en": "A platform"}),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["question"], json!({"en": "What is FOMO?", "ru": "Что такое FOMO?"}));
    assert_eq!(created["order"], 1);
    assert!(created["created_at"].is_string());

    let (status, fetched) = send(&app, test_request("GET", &format!("/api/faq/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], json!(id));

    let (status, updated) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/faq/{}", id),
            &json!({"answer_ru": "Платформа"}),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["answer"], json!({"en": "A platform", "ru": "Платформа"}));

    let (status, body) = send(&app, authed_request("DELETE", &format!("/api/faq/{}", id), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("deleted"));

    let (status, body) = send(&app, test_request("GET", &format!("/api/faq/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = send(&app, authed_request("DELETE", &format!("/api/faq/{}", id), &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_missing_document_is_not_found() {
    let app = setup_app(test_state().await);
    let token = login_token(&app).await;

    let (status, _) = send(
        &app,
        json_request("PUT", "/api/team-members/nope", &json!({"name": "x"}), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_order_is_bad_request() {
    let app = setup_app(test_state().await);
    let token = login_token(&app).await;

    let (status, body) = send(
        &app,
        json_request("POST", "/api/drawer-cards", &json!({"title": "x", "order": 1.5}), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_filters_limited_to_declared_fields() {
    let app = setup_app(test_state().await);
    let token = login_token(&app).await;

    for (name, category) in [("Binance", "partners"), ("The Block", "media"), ("Uniswap", "portfolio")] {
        let (status, _) = send(
            &app,
            json_request("POST", "/api/partners", &json!({"name": name, "category": category}), Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, media) = send(&app, test_request("GET", "/api/partners?category=media")).await;
    assert_eq!(media.as_array().unwrap().len(), 1);
    assert_eq!(media[0]["name"], "The Block");

    // `name` is not a declared filter for partners and is ignored
    let (_, all) = send(&app, test_request("GET", "/api/partners?name=Binance")).await;
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_p2p_deal_multi_field_filters() {
    let app = setup_app(test_state().await);
    let token = login_token(&app).await;

    let deals = [
        json!({"deal_type": "buy", "crypto_type": "USDT", "status": "active"}),
        json!({"deal_type": "sell", "crypto_type": "USDT", "status": "active"}),
        json!({"deal_type": "buy", "crypto_type": "BTC", "status": "closed"}),
    ];
    for deal in &deals {
        send(&app, json_request("POST", "/api/p2p-deals", deal, Some(&token))).await;
    }

    let (_, found) = send(&app, test_request("GET", "/api/p2p-deals?deal_type=buy&crypto_type=USDT")).await;
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["status"], "active");

    let (_, active) = send(&app, test_request("GET", "/api/p2p-deals?status=active")).await;
    assert_eq!(active.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_active_only_listing_and_all_route() {
    let app = setup_app(test_state().await);
    let token = login_token(&app).await;

    send(&app, json_request("POST", "/api/utilities", &json!({"title": "Visible"}), Some(&token))).await;
    send(
        &app,
        json_request("POST", "/api/utilities", &json!({"title": "Hidden", "is_active": false}), Some(&token)),
    )
    .await;

    let (_, public) = send(&app, test_request("GET", "/api/utilities")).await;
    assert_eq!(public.as_array().unwrap().len(), 1);
    assert_eq!(public[0]["title"], "Visible");
    assert_eq!(public[0]["is_active"], true);

    let (status, all) = send(&app, test_request("GET", "/api/utilities/all")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, inactive) = send(&app, test_request("GET", "/api/utilities?is_active=false")).await;
    assert_eq!(inactive.as_array().unwrap().len(), 1);
    assert_eq!(inactive[0]["title"], "Hidden");
}

#[tokio::test]
async fn test_reorder_via_post_and_put() {
    let app = setup_app(test_state().await);
    let token = login_token(&app).await;

    let mut ids = Vec::new();
    for name in ["A", "B", "C"] {
        let (_, created) = send(
            &app,
            json_request("POST", "/api/roadmap/tasks", &json!({"name_en": name, "status": "progress"}), Some(&token)),
        )
        .await;
        ids.push(created["id"].as_str().unwrap().to_string());
    }

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/roadmap/tasks/reorder",
            &json!([
                {"id": ids[0], "order": 3},
                {"id": ids[2], "order": 1},
                {"id": "missing", "order": 2}
            ]),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 2);

    let (_, listed) = send(&app, test_request("GET", "/api/roadmap/tasks")).await;
    let names: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"]["en"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["C", "B", "A"]);

    let (status, _) = send(
        &app,
        json_request("PUT", "/api/roadmap/tasks/reorder", &json!([{"id": ids[1], "order": 0}]), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, listed) = send(&app, test_request("GET", "/api/roadmap")).await;
    assert_eq!(listed["tasks"][0]["name"]["en"], "B");
    assert_eq!(listed["section_title"]["en"], "Project Roadmap");
}

#[tokio::test]
async fn test_seed_defaults_restores_bundled_partners() {
    let app = setup_app(test_state().await);
    let token = login_token(&app).await;

    send(&app, json_request("POST", "/api/partners", &json!({"name": "Temporary"}), Some(&token))).await;

    let (status, body) = send(&app, authed_request("POST", "/api/partners/seed-defaults", &token)).await;
    assert_eq!(status, StatusCode::OK);
    let count = body["count"].as_u64().unwrap();
    assert!(count > 0);

    let (_, partners) = send(&app, test_request("GET", "/api/partners")).await;
    let partners = partners.as_array().unwrap();
    assert_eq!(partners.len() as u64, count);
    assert!(partners.iter().all(|p| p["name"]["en"].is_string()));
}

// =============================================================================
// Singletons
// =============================================================================

#[tokio::test]
async fn test_singleton_created_on_first_read() {
    let app = setup_app(test_state().await);

    for path in [
        "/api/hero-settings",
        "/api/about-settings",
        "/api/footer-settings",
        "/api/community-settings",
        "/api/platform-settings",
        "/api/utilities-settings",
        "/api/cookie-consent-settings",
    ] {
        let (status, body) = send(&app, test_request("GET", path)).await;
        assert_eq!(status, StatusCode::OK, "{}", path);
        assert!(body["id"].is_string(), "{}", path);
        assert!(body["created_at"].is_string(), "{}", path);
    }

    let (_, first) = send(&app, test_request("GET", "/api/footer-settings")).await;
    let (_, second) = send(&app, test_request("GET", "/api/footer-settings")).await;
    assert_eq!(first["created_at"], second["created_at"]);
    assert_eq!(first["company_email"], "info@fomo.io");
}

#[tokio::test]
async fn test_singleton_update_requires_admin_and_merges() {
    let app = setup_app(test_state().await);
    let token = login_token(&app).await;

    let (status, _) = send(
        &app,
        json_request("PUT", "/api/hero-settings", &json!({"badge_en": "Live"}), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, updated) = send(
        &app,
        json_request("PUT", "/api/hero-settings", &json!({"badge_en": "Live"}), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["badge"]["en"], "Live");
    assert!(!updated["badge"]["ru"].as_str().unwrap().is_empty());
    assert_eq!(updated["title_line2"]["en"], "Crypto Analytics");

    let (_, read_back) = send(&app, test_request("GET", "/api/hero-settings")).await;
    assert_eq!(read_back["badge"]["en"], "Live");
}

#[tokio::test]
async fn test_cookie_consent_admin_alias() {
    let app = setup_app(test_state().await);
    let token = login_token(&app).await;

    let (status, updated) = send(
        &app,
        json_request(
            "PUT",
            "/api/admin/cookie-consent-settings",
            &json!({"enabled": false, "privacy_policy_url": "/legal/privacy"}),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["enabled"], false);

    let (_, read_back) = send(&app, test_request("GET", "/api/cookie-consent-settings")).await;
    assert_eq!(read_back["privacy_policy_url"], "/legal/privacy");
    assert_eq!(read_back["terms_url"], "/terms");
}

#[tokio::test]
async fn test_platform_section_patches() {
    let app = setup_app(test_state().await);
    let token = login_token(&app).await;

    let stat = json!({"value": "50K", "label_en": "Members", "label_ru": "Участники", "change": "+20%"});
    let (status, _) = send(&app, json_request("PATCH", "/api/platform-settings/stat/community", &stat, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        json_request("PATCH", "/api/platform-settings/stat/community", &stat, Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "community updated successfully");

    let (status, _) = send(
        &app,
        json_request("PATCH", "/api/platform-settings/stat/followers", &stat, Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let modules = json!([
        {"icon": "📊", "name_en": "Dashboard", "count": "3,000", "label_en": "users", "color": "emerald"}
    ]);
    let (status, _) = send(
        &app,
        json_request("PATCH", "/api/platform-settings/modules", &modules, Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        json_request("PATCH", "/api/platform-settings/bottom-stats", &json!([{"value": "1"}]), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, settings) = send(&app, test_request("GET", "/api/platform-settings")).await;
    assert_eq!(settings["community"]["value"], "50K");
    assert_eq!(settings["community"]["label"]["ru"], "Участники");
    assert_eq!(settings["service_modules"].as_array().unwrap().len(), 1);
    assert_eq!(settings["service_modules"][0]["name"]["en"], "Dashboard");
    assert_eq!(settings["bottom_stats"].as_array().unwrap().len(), 3);
    assert_eq!(settings["visits"]["value"], "1.2M");
}

#[tokio::test]
async fn test_content_survives_restart_with_file_database() {
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("fomo.db");

    let pool = fomo_common::db::init_database(&db_path).await.unwrap();
    let store = fomo_common::db::DocumentStore::new(pool.clone());
    let faq = fomo_api::content::LIST_RESOURCES
        .iter()
        .find(|r| r.collection == "faq_items")
        .unwrap();
    let mut payload = fomo_common::db::Document::new();
    payload.insert("question_en".to_string(), json!("Persisted?"));
    faq.create(&store, payload).await.unwrap();
    pool.close().await;

    let pool = fomo_common::db::init_database(&db_path).await.unwrap();
    let store = fomo_common::db::DocumentStore::new(pool);
    let listed = faq.list(&store, &Default::default(), false).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["question"]["en"], "Persisted?");
}
