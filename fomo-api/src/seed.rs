//! Seed data loading
//!
//! A seed file is a JSON object mapping collection name to an array of
//! documents. Singleton collections keep only their first document, stored
//! under the well-known key.

use fomo_common::db::{Document, DocumentStore};
use fomo_common::locale::collapse_suffixed_fields;
use fomo_common::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::content::singletons;

/// Seed bundled into the binaries
pub const DEFAULT_SEED: &str = include_str!("../seed/default_seed.json");

/// Collection name → documents
pub type SeedData = BTreeMap<String, Vec<Document>>;

/// Outcome for one collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    Inserted(usize),
    /// Collection already had documents and was left alone
    Skipped,
}

pub fn parse_seed(json: &str) -> Result<SeedData> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Object(collections) = value else {
        return Err(Error::InvalidInput(
            "Seed file must be an object of collection arrays".to_string(),
        ));
    };

    let mut data = SeedData::new();
    for (collection, docs) in collections {
        let Value::Array(docs) = docs else {
            return Err(Error::InvalidInput(format!(
                "Seed collection {} must be an array",
                collection
            )));
        };

        let docs = docs
            .into_iter()
            .map(|doc| match doc {
                Value::Object(doc) => Ok(doc),
                other => Err(Error::InvalidInput(format!(
                    "Seed document in {} is not an object: {}",
                    collection, other
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        data.insert(collection, docs);
    }
    Ok(data)
}

/// The bundled seed
pub fn default_seed() -> Result<SeedData> {
    parse_seed(DEFAULT_SEED)
}

/// Give a seed document its id and order, collapsing legacy locale fields
fn prepare(collection: &str, mut doc: Document, position: usize) -> Document {
    collapse_suffixed_fields(&mut doc);
    doc.remove("_id");

    match singletons::by_collection(collection) {
        Some(singleton) => {
            doc.insert("id".to_string(), Value::String(singleton.key.to_string()));
        }
        None => {
            if !doc.get("id").is_some_and(Value::is_string) {
                doc.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
            }
            doc.entry("order")
                .or_insert_with(|| Value::from(position as i64 + 1));
        }
    }
    doc
}

/// Seed one collection
///
/// Non-empty collections are skipped unless `reset` clears them first.
pub async fn seed_collection(
    store: &DocumentStore,
    collection: &str,
    docs: &[Document],
    reset: bool,
) -> Result<SeedOutcome> {
    if reset {
        let removed = store.clear(collection).await?;
        debug!("Cleared {} document(s) from {}", removed, collection);
    } else if store.count(collection).await? > 0 {
        debug!("{} already populated, skipping", collection);
        return Ok(SeedOutcome::Skipped);
    }

    let docs: &[Document] = if singletons::by_collection(collection).is_some() && docs.len() > 1 {
        warn!("{} is a singleton; only the first seed document is used", collection);
        &docs[..1]
    } else {
        docs
    };

    for (position, doc) in docs.iter().enumerate() {
        store.insert(collection, prepare(collection, doc.clone(), position)).await?;
    }

    info!("Seeded {} document(s) into {}", docs.len(), collection);
    Ok(SeedOutcome::Inserted(docs.len()))
}

/// Seed every collection of `data`
pub async fn seed_all(
    store: &DocumentStore,
    data: &SeedData,
    reset: bool,
) -> Result<BTreeMap<String, SeedOutcome>> {
    let mut outcomes = BTreeMap::new();
    for (collection, docs) in data {
        let outcome = seed_collection(store, collection, docs, reset).await?;
        outcomes.insert(collection.clone(), outcome);
    }
    Ok(outcomes)
}
