//! fomo-api - landing page CMS server
//!
//! Configuration priority: command line → environment → TOML file → defaults.

use anyhow::{Context, Result};
use clap::Parser;
use fomo_common::config::{load_toml_config, resolve_config_path, ConfigOverrides, ServiceConfig, TomlConfig};
use fomo_common::db::{init_database, DocumentStore};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

use fomo_api::auth::AdminAuth;
use fomo_api::market::{providers, CoinGecko, MarketService, PriceTicker, ProviderUrls};
use fomo_api::{build_router, AppState};

const DEFAULT_LOG_FILTER: &str = "fomo_api=info,tower_http=info";

#[derive(Debug, Parser)]
#[command(name = "fomo-api", version, about = "FOMO landing page CMS server")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "FOMO_BIND")]
    bind: Option<String>,

    /// SQLite database file
    #[arg(long, env = "FOMO_DATABASE")]
    database: Option<PathBuf>,

    /// Comma-separated allowed CORS origins, `*` for any
    #[arg(long, env = "FOMO_CORS_ORIGINS", value_delimiter = ',')]
    cors_origins: Option<Vec<String>>,

    /// Admin panel password
    #[arg(long, env = "FOMO_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,

    /// Secret for signing admin tokens
    #[arg(long, env = "FOMO_TOKEN_SECRET", hide_env_values = true)]
    token_secret: Option<String>,

    /// TOML config file (default: <config dir>/fomo/fomo-api.toml)
    #[arg(long, env = "FOMO_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins; otherwise the TOML level is applied once the config is loaded
    let rust_log = std::env::var("RUST_LOG").ok().filter(|v| !v.trim().is_empty());
    let initial = rust_log.as_deref().unwrap_or(DEFAULT_LOG_FILTER);
    let (filter, filter_handle) = reload::Layer::new(EnvFilter::try_new(initial)?);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting FOMO API (fomo-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let toml = match resolve_config_path(args.config.as_deref()) {
        Some(path) => load_toml_config(&path),
        None => TomlConfig::default(),
    };
    let overrides = ConfigOverrides {
        bind: args.bind,
        database: args.database,
        cors_origins: args.cors_origins,
        admin_password: args.admin_password,
        token_secret: args.token_secret,
    };
    let config = ServiceConfig::resolve(overrides, toml).context("Invalid configuration")?;

    if rust_log.is_none() {
        match EnvFilter::try_new(&config.log_level) {
            Ok(level) => {
                if let Err(e) = filter_handle.reload(level) {
                    warn!("Failed to apply log level {}: {}", config.log_level, e);
                }
            }
            Err(e) => warn!("Invalid log level {}: {}", config.log_level, e),
        }
    }

    info!("Database path: {}", config.database_path.display());
    let pool = match init_database(&config.database_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e).context("Database initialization failed");
        }
    };

    let auth = match config.token_secret.as_deref() {
        Some(secret) => AdminAuth::new(&config.admin_password, secret.as_bytes(), config.token_ttl),
        None => {
            warn!("No token secret configured; admin tokens will not survive a restart");
            AdminAuth::with_random_secret(&config.admin_password, config.token_ttl)
        }
    };

    let store = DocumentStore::new(pool.clone());
    let urls = ProviderUrls::default();
    let market = MarketService::with_default_providers(store, &config.market, &urls)
        .context("Failed to build market data client")?;
    let price_client =
        providers::http_client(config.market.request_timeout).context("Failed to build price client")?;
    let prices = PriceTicker::new(
        CoinGecko::new(price_client, urls.coingecko.clone()),
        config.market.prices_ttl,
    );

    if config.allows_any_origin() {
        info!("CORS: any origin allowed");
    } else {
        info!("CORS: {}", config.cors_origins.join(", "));
    }

    let state = AppState::new(pool, auth, market, prices);
    let app = build_router(state, &config.cors_origins);

    let listener = tokio::net::TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    info!("fomo-api listening on http://{}", config.bind_address);
    info!("Health check: http://{}/api/health", config.bind_address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("fomo-api stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
