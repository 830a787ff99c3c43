//! JSON document store over the `documents` table
//!
//! Each collection is a set of JSON objects keyed by their `id` field. The
//! store owns the bookkeeping fields of every document:
//! - `id`: required string, unique within the collection
//! - `order`: integer used for list ordering (mirrored in `sort_order`)
//! - `created_at` / `updated_at`: RFC 3339 UTC timestamps

use crate::{Error, Result};
use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::SqlitePool;

/// A stored JSON object
pub type Document = Map<String, Value>;

/// Fields managed by the store; never overwritten by a merge patch
const IMMUTABLE_FIELDS: [&str; 2] = ["id", "created_at"];

/// Collection-scoped CRUD over JSON documents
#[derive(Clone)]
pub struct DocumentStore {
    pool: SqlitePool,
}

impl DocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Fetch one document
    pub async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT body FROM documents WHERE collection = ? AND id = ?")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(body,)| parse_body(&body)).transpose()
    }

    /// List a collection ordered by `order`, then creation time
    ///
    /// `filters` are top-level field equality checks. Strings, booleans and
    /// numbers are supported.
    pub async fn list(&self, collection: &str, filters: &[(String, Value)]) -> Result<Vec<Document>> {
        let mut sql = String::from("SELECT body FROM documents WHERE collection = ?");
        for (field, _) in filters {
            if !is_valid_field_name(field) {
                return Err(Error::InvalidInput(format!("Invalid filter field: {}", field)));
            }
            sql.push_str(" AND json_extract(body, ?) = ?");
        }
        sql.push_str(" ORDER BY sort_order ASC, created_at ASC, id ASC");

        let mut query = sqlx::query_as::<_, (String,)>(&sql).bind(collection);
        for (field, value) in filters {
            query = query.bind(format!("$.{}", field));
            query = match value {
                Value::String(s) => query.bind(s.clone()),
                Value::Bool(b) => query.bind(i64::from(*b)),
                Value::Number(n) if n.is_i64() => query.bind(n.as_i64()),
                Value::Number(n) => query.bind(n.as_f64()),
                other => {
                    return Err(Error::InvalidInput(format!(
                        "Unsupported filter value for {}: {}",
                        field, other
                    )))
                }
            };
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(|(body,)| parse_body(body)).collect()
    }

    pub async fn count(&self, collection: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = ?")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Order value that places a new document after every existing one
    pub async fn next_order(&self, collection: &str) -> Result<i64> {
        let max: Option<i64> =
            sqlx::query_scalar("SELECT MAX(sort_order) FROM documents WHERE collection = ?")
                .bind(collection)
                .fetch_one(&self.pool)
                .await?;
        Ok(max.map(|m| m + 1).unwrap_or(1))
    }

    /// Insert a new document; fails if the id is already taken
    pub async fn insert(&self, collection: &str, mut doc: Document) -> Result<Document> {
        let id = document_id(&doc)?;
        let now = Utc::now().to_rfc3339();
        doc.entry("created_at").or_insert_with(|| Value::String(now.clone()));
        doc.insert("updated_at".to_string(), Value::String(now));

        let result = sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body, sort_order, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(collection)
        .bind(&id)
        .bind(serde_json::to_string(&doc)?)
        .bind(order_of(&doc))
        .bind(timestamp_field(&doc, "created_at"))
        .bind(timestamp_field(&doc, "updated_at"))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(doc),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                Error::InvalidInput(format!("Document {} already exists in {}", id, collection)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert or fully replace a document
    pub async fn upsert(&self, collection: &str, mut doc: Document) -> Result<Document> {
        let id = document_id(&doc)?;
        let now = Utc::now().to_rfc3339();
        doc.entry("created_at").or_insert_with(|| Value::String(now.clone()));
        doc.insert("updated_at".to_string(), Value::String(now));

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body, sort_order, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(collection, id) DO UPDATE SET
                body = excluded.body,
                sort_order = excluded.sort_order,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(collection)
        .bind(&id)
        .bind(serde_json::to_string(&doc)?)
        .bind(order_of(&doc))
        .bind(timestamp_field(&doc, "created_at"))
        .bind(timestamp_field(&doc, "updated_at"))
        .execute(&self.pool)
        .await?;

        Ok(doc)
    }

    /// Apply a partial update; returns `None` if the document does not exist
    ///
    /// Null patch values are ignored. Object values are merged one level deep
    /// so a patch of `{"title": {"ru": "..."}}` keeps the English text.
    pub async fn merge(&self, collection: &str, id: &str, patch: Document) -> Result<Option<Document>> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(String,)> =
            sqlx::query_as("SELECT body FROM documents WHERE collection = ? AND id = ?")
                .bind(collection)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((body,)) = row else {
            return Ok(None);
        };

        let mut doc = parse_body(&body)?;
        apply_patch(&mut doc, patch);
        doc.insert("updated_at".to_string(), Value::String(Utc::now().to_rfc3339()));

        sqlx::query(
            "UPDATE documents SET body = ?, sort_order = ?, updated_at = ? WHERE collection = ? AND id = ?",
        )
        .bind(serde_json::to_string(&doc)?)
        .bind(order_of(&doc))
        .bind(timestamp_field(&doc, "updated_at"))
        .bind(collection)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(doc))
    }

    /// Move one document to a new `order`; returns false if it does not exist
    pub async fn set_order(&self, collection: &str, id: &str, order: i64) -> Result<bool> {
        let mut patch = Document::new();
        patch.insert("order".to_string(), Value::from(order));
        Ok(self.merge(collection, id, patch).await?.is_some())
    }

    /// Delete one document; returns false if it did not exist
    pub async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every document of a collection
    pub async fn clear(&self, collection: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ?")
            .bind(collection)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Merge `patch` into `doc` (see [`DocumentStore::merge`])
pub fn apply_patch(doc: &mut Document, patch: Document) {
    for (key, value) in patch {
        if value.is_null() || IMMUTABLE_FIELDS.contains(&key.as_str()) {
            continue;
        }

        match (doc.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                for (k, v) in incoming {
                    if !v.is_null() {
                        existing.insert(k, v);
                    }
                }
            }
            (_, value) => {
                doc.insert(key, value);
            }
        }
    }
}

/// Only plain identifiers may appear in a JSON path
fn is_valid_field_name(name: &str) -> bool {
    !name.is_empty() && name.len() < 64 && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_body(body: &str) -> Result<Document> {
    match serde_json::from_str::<Value>(body)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::Internal(format!("Stored document is not an object: {}", other))),
    }
}

fn document_id(doc: &Document) -> Result<String> {
    doc.get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidInput("Document is missing a string id".to_string()))
}

fn order_of(doc: &Document) -> i64 {
    doc.get("order")
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
        .unwrap_or(0)
}

fn timestamp_field(doc: &Document, key: &str) -> String {
    doc.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| Utc::now().to_rfc3339())
}
