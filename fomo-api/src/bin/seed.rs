//! fomo-seed - populate an empty database with landing page content
//!
//! Collections that already hold documents are left alone unless `--reset`
//! is given, which clears each seeded collection first.

use anyhow::{Context, Result};
use clap::Parser;
use fomo_common::config::default_database_path;
use fomo_common::db::{init_database, DocumentStore};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fomo_api::seed::{self, SeedOutcome};

#[derive(Debug, Parser)]
#[command(name = "fomo-seed", version, about = "Seed the FOMO content database")]
struct Args {
    /// SQLite database file
    #[arg(long, env = "FOMO_DATABASE")]
    database: Option<PathBuf>,

    /// JSON file mapping collection name to documents (default: bundled seed)
    #[arg(long)]
    seed_file: Option<PathBuf>,

    /// Clear seeded collections before inserting
    #[arg(long)]
    reset: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fomo_api=info")),
        )
        .init();

    let args = Args::parse();

    let data = match &args.seed_file {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read seed file {}", path.display()))?;
            seed::parse_seed(&json).with_context(|| format!("Invalid seed file {}", path.display()))?
        }
        None => seed::default_seed().context("Bundled seed is invalid")?,
    };

    let db_path = args.database.unwrap_or_else(default_database_path);
    info!("Seeding {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .context("Database initialization failed")?;
    let store = DocumentStore::new(pool);

    let outcomes = seed::seed_all(&store, &data, args.reset).await?;

    let mut inserted = 0;
    for (collection, outcome) in &outcomes {
        match outcome {
            SeedOutcome::Inserted(count) => {
                inserted += count;
                info!("  {}: {} inserted", collection, count);
            }
            SeedOutcome::Skipped => info!("  {}: already populated", collection),
        }
    }
    info!("✓ Seeding complete ({} document(s) inserted)", inserted);

    Ok(())
}
