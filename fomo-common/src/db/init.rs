//! Database initialization
//!
//! Opens (or creates) the SQLite database and ensures every table exists.
//! Table creation is idempotent and runs on every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets readers proceed while a request handler writes
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// In-memory database for tests and dry runs
///
/// Limited to one connection: every SQLite `:memory:` connection is a separate database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_documents_table(pool).await?;
    create_analytics_events_table(pool).await?;
    Ok(())
}

/// Content documents: one row per (collection, id), JSON body
pub async fn create_documents_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            body TEXT NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (collection, id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_documents_order ON documents(collection, sort_order)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Raw analytics facts; rows are only inserted, aggregated, or bulk-deleted
pub async fn create_analytics_events_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS analytics_events (
            id TEXT PRIMARY KEY,
            session_id TEXT NOT NULL,
            event_type TEXT NOT NULL,
            page_url TEXT,
            page_title TEXT,
            button_id TEXT,
            button_text TEXT,
            user_agent TEXT,
            device_type TEXT NOT NULL,
            browser TEXT NOT NULL,
            os TEXT NOT NULL,
            country TEXT NOT NULL DEFAULT 'Unknown',
            city TEXT NOT NULL DEFAULT 'Unknown',
            ip_address TEXT,
            referrer TEXT,
            traffic_source TEXT NOT NULL,
            source_detail TEXT NOT NULL,
            timestamp_ms INTEGER NOT NULL,
            session_duration INTEGER,
            is_new_visitor INTEGER NOT NULL DEFAULT 1,
            is_returning INTEGER NOT NULL DEFAULT 0,
            conversion_type TEXT,
            conversion_value REAL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_analytics_timestamp ON analytics_events(timestamp_ms)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_analytics_session ON analytics_events(session_id, event_type)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
