//! Section-level updates of the platform settings document
//!
//! The admin panel edits one stat card or one list at a time. Payloads may
//! use legacy `_en`/`_ru` fields; each item is validated against its typed
//! shape before it replaces the stored section.

use fomo_common::db::{Document, DocumentStore};
use fomo_common::locale::collapse_suffixed_fields;
use fomo_common::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::defaults::{BottomStat, PlatformStat, ServiceItem, ServiceModule};
use super::singletons::{self, SingletonResource};

pub const PLATFORM_COLLECTION: &str = "platform_settings";

/// Stat cards that can be edited one by one
pub const PLATFORM_STATS: &[&str] = &["community", "visits", "projects", "alerts"];

/// List sections replaced as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformSection {
    ServiceModules,
    ServicesList,
    BottomStats,
}

impl PlatformSection {
    pub fn field(self) -> &'static str {
        match self {
            PlatformSection::ServiceModules => "service_modules",
            PlatformSection::ServicesList => "services_list",
            PlatformSection::BottomStats => "bottom_stats",
        }
    }

    /// Human-readable name for response messages
    pub fn label(self) -> &'static str {
        match self {
            PlatformSection::ServiceModules => "Service modules",
            PlatformSection::ServicesList => "Services list",
            PlatformSection::BottomStats => "Bottom stats",
        }
    }
}

fn platform() -> Result<&'static SingletonResource> {
    singletons::by_collection(PLATFORM_COLLECTION)
        .ok_or_else(|| Error::Internal("platform settings are not registered".to_string()))
}

/// Collapse locale pairs and check `item` against `T`
fn typed_item<T: DeserializeOwned + Serialize>(mut item: Document, what: &str) -> Result<Value> {
    collapse_suffixed_fields(&mut item);
    let typed: T = serde_json::from_value(Value::Object(item))
        .map_err(|e| Error::InvalidInput(format!("Invalid {}: {}", what, e)))?;
    Ok(serde_json::to_value(typed)?)
}

async fn set_field(store: &DocumentStore, field: &str, value: Value) -> Result<Document> {
    let mut patch = Document::new();
    patch.insert(field.to_string(), value);
    platform()?.update(store, patch).await
}

/// Replace one stat card
pub async fn update_stat(store: &DocumentStore, name: &str, stat: Document) -> Result<Document> {
    if !PLATFORM_STATS.contains(&name) {
        return Err(Error::InvalidInput(format!("Invalid stat name: {}", name)));
    }

    let value = typed_item::<PlatformStat>(stat, "stat")?;
    let updated = set_field(store, name, value).await?;
    info!("Updated platform stat {}", name);
    Ok(updated)
}

/// Replace a whole list section
pub async fn replace_section(
    store: &DocumentStore,
    section: PlatformSection,
    items: Vec<Document>,
) -> Result<Document> {
    let values = items
        .into_iter()
        .map(|item| match section {
            PlatformSection::ServiceModules => typed_item::<ServiceModule>(item, "service module"),
            PlatformSection::ServicesList => typed_item::<ServiceItem>(item, "service item"),
            PlatformSection::BottomStats => typed_item::<BottomStat>(item, "bottom stat"),
        })
        .collect::<Result<Vec<Value>>>()?;

    let count = values.len();
    let updated = set_field(store, section.field(), Value::Array(values)).await?;
    info!("Replaced platform {} ({} item(s))", section.field(), count);
    Ok(updated)
}
