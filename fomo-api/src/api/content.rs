//! Content endpoints generated from the resource registries
//!
//! List resource `/api/<path>`:
//! - GET `/`, GET `/:id`: public
//! - POST `/`, PUT `/:id`, DELETE `/:id`, POST|PUT `/reorder`: admin
//! - GET `/all` (active-only resources): every document regardless of `is_active`
//! - POST `/seed-defaults` (seedable resources): admin, restores bundled documents
//!
//! Singleton `/api/<path>`: public GET, admin PUT.
//!
//! Platform settings also take admin PATCH on `/stat/:name`, `/modules`,
//! `/services` and `/bottom-stats` to replace one section.

use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post, put},
    Json, Router,
};
use fomo_common::db::Document;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::info;

use super::auth::RequireAdmin;
use crate::content::platform::{self, PlatformSection, PLATFORM_COLLECTION};
use crate::content::{ListResource, OrderUpdate, SingletonResource, LIST_RESOURCES, SINGLETONS};
use crate::error::{ApiError, ApiResult};
use crate::seed;
use crate::AppState;

fn documents(docs: Vec<Document>) -> Json<Value> {
    Json(Value::Array(docs.into_iter().map(Value::Object).collect()))
}

async fn list(
    resource: &'static ListResource,
    state: AppState,
    query: HashMap<String, String>,
    include_inactive: bool,
) -> ApiResult<Json<Value>> {
    let docs = resource.list(&state.store, &query, include_inactive).await?;
    Ok(documents(docs))
}

async fn get_one(resource: &'static ListResource, state: AppState, id: String) -> ApiResult<Json<Document>> {
    Ok(Json(resource.get(&state.store, &id).await?))
}

async fn create(resource: &'static ListResource, state: AppState, body: Document) -> ApiResult<Json<Document>> {
    Ok(Json(resource.create(&state.store, body).await?))
}

async fn update(
    resource: &'static ListResource,
    state: AppState,
    id: String,
    body: Document,
) -> ApiResult<Json<Document>> {
    Ok(Json(resource.update(&state.store, &id, body).await?))
}

async fn remove(resource: &'static ListResource, state: AppState, id: String) -> ApiResult<Json<Value>> {
    resource.delete(&state.store, &id).await?;
    Ok(Json(json!({
        "message": format!("{} deleted successfully", resource.label),
    })))
}

async fn reorder(
    resource: &'static ListResource,
    state: AppState,
    updates: Vec<OrderUpdate>,
) -> ApiResult<Json<Value>> {
    let moved = resource.reorder(&state.store, &updates).await?;
    info!("Reordered {} of {} {} document(s)", moved, updates.len(), resource.collection);
    Ok(Json(json!({
        "message": "Order updated successfully",
        "updated": moved,
    })))
}

async fn seed_defaults(resource: &'static ListResource, state: AppState) -> ApiResult<Json<Value>> {
    let data = seed::default_seed()?;
    let docs = data.get(resource.collection).ok_or_else(|| {
        ApiError::Internal(format!("No bundled defaults for {}", resource.collection))
    })?;

    seed::seed_collection(&state.store, resource.collection, docs, true).await?;
    Ok(Json(json!({
        "message": format!("Seeded {} default document(s)", docs.len()),
        "count": docs.len(),
    })))
}

/// Routes for one list resource
fn list_resource_routes(resource: &'static ListResource) -> Router<AppState> {
    let base = format!("/api/{}", resource.path);

    let mut router = Router::new()
        .route(
            &base,
            get(
                move |State(state): State<AppState>, Query(query): Query<HashMap<String, String>>| {
                    list(resource, state, query, false)
                },
            )
            .post(
                move |_admin: RequireAdmin, State(state): State<AppState>, Json(body): Json<Document>| {
                    create(resource, state, body)
                },
            ),
        )
        .route(
            &format!("{}/reorder", base),
            post(
                move |_admin: RequireAdmin,
                      State(state): State<AppState>,
                      Json(updates): Json<Vec<OrderUpdate>>| reorder(resource, state, updates),
            )
            .put(
                move |_admin: RequireAdmin,
                      State(state): State<AppState>,
                      Json(updates): Json<Vec<OrderUpdate>>| reorder(resource, state, updates),
            ),
        )
        .route(
            &format!("{}/:id", base),
            get(move |State(state): State<AppState>, Path(id): Path<String>| {
                get_one(resource, state, id)
            })
            .put(
                move |_admin: RequireAdmin,
                      State(state): State<AppState>,
                      Path(id): Path<String>,
                      Json(body): Json<Document>| update(resource, state, id, body),
            )
            .delete(
                move |_admin: RequireAdmin, State(state): State<AppState>, Path(id): Path<String>| {
                    remove(resource, state, id)
                },
            ),
        );

    if resource.active_only {
        router = router.route(
            &format!("{}/all", base),
            get(
                move |State(state): State<AppState>, Query(query): Query<HashMap<String, String>>| {
                    list(resource, state, query, true)
                },
            ),
        );
    }

    if resource.seedable {
        router = router.route(
            &format!("{}/seed-defaults", base),
            post(move |_admin: RequireAdmin, State(state): State<AppState>| {
                seed_defaults(resource, state)
            }),
        );
    }

    router
}

async fn read_singleton(singleton: &'static SingletonResource, state: AppState) -> ApiResult<Json<Document>> {
    Ok(Json(singleton.read(&state.store).await?))
}

async fn update_singleton(
    singleton: &'static SingletonResource,
    state: AppState,
    body: Document,
) -> ApiResult<Json<Document>> {
    Ok(Json(singleton.update(&state.store, body).await?))
}

fn singleton_update_handler(
    singleton: &'static SingletonResource,
) -> axum::routing::MethodRouter<AppState> {
    put(
        move |_admin: RequireAdmin, State(state): State<AppState>, Json(body): Json<Document>| {
            update_singleton(singleton, state, body)
        },
    )
}

/// PATCH /api/platform-settings/stat/:name
async fn update_platform_stat(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(stat): Json<Document>,
) -> ApiResult<Json<Value>> {
    platform::update_stat(&state.store, &name, stat).await?;
    Ok(Json(json!({ "message": format!("{} updated successfully", name) })))
}

async fn replace_platform_section(
    section: PlatformSection,
    state: AppState,
    items: Vec<Document>,
) -> ApiResult<Json<Value>> {
    platform::replace_section(&state.store, section, items).await?;
    Ok(Json(json!({ "message": format!("{} updated successfully", section.label()) })))
}

fn platform_section_routes() -> Router<AppState> {
    let sections = [
        ("modules", PlatformSection::ServiceModules),
        ("services", PlatformSection::ServicesList),
        ("bottom-stats", PlatformSection::BottomStats),
    ];

    sections.into_iter().fold(
        Router::new().route("/api/platform-settings/stat/:name", patch(update_platform_stat)),
        |router, (segment, section)| {
            router.route(
                &format!("/api/platform-settings/{}", segment),
                patch(
                    move |_admin: RequireAdmin,
                          State(state): State<AppState>,
                          Json(items): Json<Vec<Document>>| {
                        replace_platform_section(section, state, items)
                    },
                ),
            )
        },
    )
}

/// Routes for one singleton settings document
fn singleton_routes(singleton: &'static SingletonResource) -> Router<AppState> {
    let path = format!("/api/{}", singleton.path);
    let mut router = Router::new().route(
        &path,
        get(move |State(state): State<AppState>| read_singleton(singleton, state))
            .merge(singleton_update_handler(singleton)),
    );

    // The admin panel saves cookie consent under the admin prefix
    if singleton.collection == "cookie_consent_settings" {
        router = router.route(
            &format!("/api/admin/{}", singleton.path),
            singleton_update_handler(singleton),
        );
    }

    if singleton.collection == PLATFORM_COLLECTION {
        router = router.merge(platform_section_routes());
    }

    router
}

pub fn content_routes() -> Router<AppState> {
    let lists = LIST_RESOURCES
        .iter()
        .fold(Router::new(), |router, resource| router.merge(list_resource_routes(resource)));

    SINGLETONS
        .iter()
        .fold(lists, |router, singleton| router.merge(singleton_routes(singleton)))
}
