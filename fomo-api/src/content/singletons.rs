//! Singleton settings documents, lazily created with defaults on first read

use fomo_common::db::{Document, DocumentStore};
use fomo_common::{Error, Result};
use serde_json::Value;
use tracing::{debug, info};

use super::defaults;
use super::resources::normalize_payload;

/// One well-known settings document
#[derive(Debug)]
pub struct SingletonResource {
    /// URL segment under `/api`
    pub path: &'static str,
    pub collection: &'static str,
    /// Fixed document id
    pub key: &'static str,
    pub defaults: fn() -> Result<Document>,
    /// List collection embedded into reads as `(field, collection)`
    pub embed: Option<(&'static str, &'static str)>,
}

pub static SINGLETONS: &[SingletonResource] = &[
    SingletonResource {
        path: "hero-settings",
        collection: "hero_settings",
        key: "hero_settings",
        defaults: defaults::hero,
        embed: None,
    },
    SingletonResource {
        path: "about-settings",
        collection: "about_settings",
        key: "about_settings",
        defaults: defaults::about,
        embed: None,
    },
    SingletonResource {
        path: "footer-settings",
        collection: "footer_settings",
        key: "footer_settings",
        defaults: defaults::footer,
        embed: None,
    },
    SingletonResource {
        path: "community-settings",
        collection: "community_settings",
        key: "community_settings",
        defaults: defaults::community,
        embed: None,
    },
    SingletonResource {
        path: "platform-settings",
        collection: "platform_settings",
        key: "platform_settings",
        defaults: defaults::platform,
        embed: None,
    },
    SingletonResource {
        path: "roadmap",
        collection: "roadmap_settings",
        key: "roadmap_settings",
        defaults: defaults::roadmap,
        embed: Some(("tasks", "roadmap_tasks")),
    },
    SingletonResource {
        path: "utilities-settings",
        collection: "utilities_settings",
        key: "utilities_settings",
        defaults: defaults::utilities_section,
        embed: None,
    },
    SingletonResource {
        path: "cookie-consent-settings",
        collection: "cookie_consent_settings",
        key: "cookie_consent_settings",
        defaults: defaults::cookie_consent,
        embed: None,
    },
];

/// Look up a singleton by its collection name
pub fn by_collection(collection: &str) -> Option<&'static SingletonResource> {
    SINGLETONS.iter().find(|s| s.collection == collection)
}

impl SingletonResource {
    /// Stored document, created from defaults if it does not exist yet
    pub async fn get_or_create(&self, store: &DocumentStore) -> Result<Document> {
        if let Some(doc) = store.get(self.collection, self.key).await? {
            return Ok(doc);
        }

        let mut doc = (self.defaults)()?;
        doc.insert("id".to_string(), Value::String(self.key.to_string()));

        match store.insert(self.collection, doc).await {
            Ok(doc) => {
                info!("Created default {}", self.key);
                Ok(doc)
            }
            // Lost a race with a concurrent first read
            Err(Error::InvalidInput(_)) => {
                debug!("{} was created concurrently", self.key);
                store
                    .get(self.collection, self.key)
                    .await?
                    .ok_or_else(|| Error::Internal(format!("{} vanished after insert", self.key)))
            }
            Err(e) => Err(e),
        }
    }

    /// Read with embedded list documents attached
    pub async fn read(&self, store: &DocumentStore) -> Result<Document> {
        let mut doc = self.get_or_create(store).await?;
        if let Some((field, collection)) = self.embed {
            let items = store.list(collection, &[]).await?;
            doc.insert(
                field.to_string(),
                Value::Array(items.into_iter().map(Value::Object).collect()),
            );
        }
        Ok(doc)
    }

    /// Merge a partial update; missing documents are created from defaults first
    pub async fn update(&self, store: &DocumentStore, payload: Document) -> Result<Document> {
        let mut patch = normalize_payload(payload);
        if let Some((field, _)) = self.embed {
            patch.remove(field);
        }

        self.get_or_create(store).await?;
        let updated = store
            .merge(self.collection, self.key, patch)
            .await?
            .ok_or_else(|| Error::NotFound(format!("{} not found", self.key)))?;

        info!("Updated {}", self.key);
        Ok(updated)
    }
}
