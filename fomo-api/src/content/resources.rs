//! List resources: independent ordered documents in one collection
//!
//! Every list entity (team members, partners, FAQ items, ...) behaves the
//! same way, so each is described by a [`ListResource`] entry and served by
//! one set of operations instead of a hand-written handler group per entity.

use fomo_common::db::{Document, DocumentStore};
use fomo_common::locale::collapse_suffixed_fields;
use fomo_common::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

/// Fields the server owns; stripped from incoming payloads
const SERVER_FIELDS: [&str; 4] = ["id", "_id", "created_at", "updated_at"];

/// Static description of one list resource
#[derive(Debug)]
pub struct ListResource {
    /// URL segment(s) under `/api`
    pub path: &'static str,
    pub collection: &'static str,
    /// Singular name used in messages
    pub label: &'static str,
    /// Query parameters accepted as equality filters
    pub filter_fields: &'static [&'static str],
    /// Public listing only shows `is_active: true` documents
    pub active_only: bool,
    /// Bundled defaults can be restored through `POST /seed-defaults`
    pub seedable: bool,
}

pub static LIST_RESOURCES: &[ListResource] = &[
    ListResource {
        path: "drawer-cards",
        collection: "drawer_cards",
        label: "Drawer card",
        filter_fields: &[],
        active_only: false,
        seedable: false,
    },
    ListResource {
        path: "team-members",
        collection: "team_members",
        label: "Team member",
        filter_fields: &[],
        active_only: false,
        seedable: false,
    },
    ListResource {
        path: "partners",
        collection: "partners",
        label: "Partner",
        filter_fields: &["category"],
        active_only: false,
        seedable: true,
    },
    ListResource {
        path: "faq",
        collection: "faq_items",
        label: "FAQ item",
        filter_fields: &[],
        active_only: false,
        seedable: false,
    },
    ListResource {
        path: "roadmap/tasks",
        collection: "roadmap_tasks",
        label: "Roadmap task",
        filter_fields: &["status"],
        active_only: false,
        seedable: false,
    },
    ListResource {
        path: "evolution-levels",
        collection: "evolution_levels",
        label: "Evolution level",
        filter_fields: &[],
        active_only: false,
        seedable: false,
    },
    ListResource {
        path: "evolution-badges",
        collection: "evolution_badges",
        label: "Evolution badge",
        filter_fields: &[],
        active_only: false,
        seedable: false,
    },
    ListResource {
        path: "p2p-deals",
        collection: "p2p_deals",
        label: "P2P deal",
        filter_fields: &["deal_type", "crypto_type", "status"],
        active_only: false,
        seedable: false,
    },
    ListResource {
        path: "arena-predictions",
        collection: "arena_predictions",
        label: "Prediction",
        filter_fields: &["category", "status"],
        active_only: false,
        seedable: false,
    },
    ListResource {
        path: "influence-entities",
        collection: "influence_entities",
        label: "Influence entity",
        filter_fields: &["entity_type", "category"],
        active_only: false,
        seedable: false,
    },
    ListResource {
        path: "earlyland-opportunities",
        collection: "earlyland_opportunities",
        label: "Opportunity",
        filter_fields: &["category", "status"],
        active_only: false,
        seedable: false,
    },
    ListResource {
        path: "hero-buttons",
        collection: "hero_buttons",
        label: "Hero button",
        filter_fields: &["is_active"],
        active_only: true,
        seedable: false,
    },
    ListResource {
        path: "navigation-items",
        collection: "navigation_items",
        label: "Navigation item",
        filter_fields: &["is_active"],
        active_only: true,
        seedable: false,
    },
    ListResource {
        path: "utilities",
        collection: "utilities",
        label: "Utility",
        filter_fields: &["is_active"],
        active_only: true,
        seedable: true,
    },
    ListResource {
        path: "utility-nav-buttons",
        collection: "utility_nav_buttons",
        label: "Utility nav button",
        filter_fields: &["is_active"],
        active_only: false,
        seedable: false,
    },
];

/// One entry of a reorder request
#[derive(Debug, Clone, Deserialize)]
pub struct OrderUpdate {
    pub id: String,
    pub order: i64,
}

/// Drop server-owned fields and collapse legacy `_en`/`_ru` pairs
pub fn normalize_payload(mut doc: Document) -> Document {
    for field in SERVER_FIELDS {
        doc.remove(field);
    }
    collapse_suffixed_fields(&mut doc);
    doc
}

/// `order` must be an integer when present
fn check_order(doc: &Document) -> Result<()> {
    match doc.get("order") {
        None | Some(Value::Null) => Ok(()),
        Some(value) if value.as_i64().is_some() => Ok(()),
        Some(value) => Err(Error::InvalidInput(format!(
            "order must be an integer, got {}",
            value
        ))),
    }
}

/// Query-string value as JSON; `true`/`false` become booleans
pub fn filter_value(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        other => Value::String(other.to_string()),
    }
}

impl ListResource {
    /// Equality filters from query parameters; undeclared parameters are ignored
    pub fn filters(&self, query: &HashMap<String, String>, include_inactive: bool) -> Vec<(String, Value)> {
        let mut filters: Vec<(String, Value)> = self
            .filter_fields
            .iter()
            .filter_map(|field| {
                query
                    .get(*field)
                    .filter(|v| !v.is_empty())
                    .map(|v| (field.to_string(), filter_value(v)))
            })
            .collect();

        if self.active_only && !include_inactive && !filters.iter().any(|(f, _)| f == "is_active") {
            filters.push(("is_active".to_string(), Value::Bool(true)));
        }
        filters
    }

    pub async fn list(
        &self,
        store: &DocumentStore,
        query: &HashMap<String, String>,
        include_inactive: bool,
    ) -> Result<Vec<Document>> {
        let filters = self.filters(query, include_inactive);
        debug!("Listing {} with {} filter(s)", self.collection, filters.len());
        store.list(self.collection, &filters).await
    }

    pub async fn get(&self, store: &DocumentStore, id: &str) -> Result<Document> {
        store
            .get(self.collection, id)
            .await?
            .ok_or_else(|| self.not_found(id))
    }

    /// Insert a new document with a fresh id, appended after existing ones
    pub async fn create(&self, store: &DocumentStore, payload: Document) -> Result<Document> {
        let mut doc = normalize_payload(payload);
        check_order(&doc)?;

        if doc.get("order").map_or(true, Value::is_null) {
            let order = store.next_order(self.collection).await?;
            doc.insert("order".to_string(), Value::from(order));
        }
        if self.active_only {
            doc.entry("is_active").or_insert(Value::Bool(true));
        }
        doc.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));

        let created = store.insert(self.collection, doc).await?;
        info!("Created {} in {}", self.label.to_lowercase(), self.collection);
        Ok(created)
    }

    /// Merge a partial update into an existing document
    pub async fn update(&self, store: &DocumentStore, id: &str, payload: Document) -> Result<Document> {
        let patch = normalize_payload(payload);
        check_order(&patch)?;

        store
            .merge(self.collection, id, patch)
            .await?
            .ok_or_else(|| self.not_found(id))
    }

    pub async fn delete(&self, store: &DocumentStore, id: &str) -> Result<()> {
        if store.delete(self.collection, id).await? {
            info!("Deleted {} {} from {}", self.label.to_lowercase(), id, self.collection);
            Ok(())
        } else {
            Err(self.not_found(id))
        }
    }

    /// Apply new `order` values; unknown ids are skipped, returns how many moved
    pub async fn reorder(&self, store: &DocumentStore, updates: &[OrderUpdate]) -> Result<usize> {
        let mut moved = 0;
        for update in updates {
            if store.set_order(self.collection, &update.id, update.order).await? {
                moved += 1;
            } else {
                debug!("Reorder skipped unknown {} {}", self.collection, update.id);
            }
        }
        Ok(moved)
    }

    fn not_found(&self, id: &str) -> Error {
        Error::NotFound(format!("{} {} not found", self.label, id))
    }
}
