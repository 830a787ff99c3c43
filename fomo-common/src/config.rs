//! Configuration loading and resolution
//!
//! Every setting resolves in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Tiers 1 and 2 are both handled by clap (`#[arg(env = ...)]`) in the
//! binaries and arrive here as [`ConfigOverrides`]. A missing or broken TOML
//! file never stops startup: it logs a warning and the defaults apply.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit TOML config file
pub const CONFIG_ENV_VAR: &str = "FOMO_CONFIG";

pub const DEFAULT_BIND: &str = "0.0.0.0:8001";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 12 * 60 * 60;
pub const DEFAULT_MARKET_TTL_SECS: u64 = 60 * 60;
pub const DEFAULT_PRICES_TTL_SECS: u64 = 5 * 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// On-disk TOML configuration; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub bind: Option<String>,
    pub database: Option<PathBuf>,
    pub cors_origins: Option<Vec<String>>,
    pub admin_password: Option<String>,
    pub token_secret: Option<String>,
    #[serde(default)]
    pub auth: AuthSection,
    #[serde(default)]
    pub market: MarketSection,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthSection {
    pub token_ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSection {
    pub market_ttl_secs: Option<u64>,
    pub prices_ttl_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing-subscriber filter directive, e.g. "info" or "fomo_api=debug"
    pub level: Option<String>,
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind: Option<String>,
    pub database: Option<PathBuf>,
    pub cors_origins: Option<Vec<String>>,
    pub admin_password: Option<String>,
    pub token_secret: Option<String>,
}

/// Market data cache and upstream settings
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSettings {
    /// Maximum age of the cached market snapshot
    pub market_ttl: Duration,
    /// Maximum age of the cached price-only feed
    pub prices_ttl: Duration,
    /// Per-call timeout for provider requests
    pub request_timeout: Duration,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            market_ttl: Duration::from_secs(DEFAULT_MARKET_TTL_SECS),
            prices_ttl: Duration::from_secs(DEFAULT_PRICES_TTL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_address: SocketAddr,
    pub database_path: PathBuf,
    /// Allowed CORS origins; `*` allows any origin
    pub cors_origins: Vec<String>,
    pub admin_password: String,
    /// Token signing secret; `None` means the caller generates one per process
    pub token_secret: Option<String>,
    pub token_ttl: Duration,
    pub market: MarketSettings,
    pub log_level: String,
}

impl ServiceConfig {
    /// Merge overrides over TOML values over compiled defaults
    pub fn resolve(overrides: ConfigOverrides, toml: TomlConfig) -> Result<Self> {
        let bind = overrides
            .bind
            .or(toml.bind)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_address: SocketAddr = bind
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address '{}': {}", bind, e)))?;

        let database_path = overrides
            .database
            .or(toml.database)
            .unwrap_or_else(default_database_path);

        let cors_origins = overrides
            .cors_origins
            .or(toml.cors_origins)
            .map(|origins| {
                origins
                    .into_iter()
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| vec!["*".to_string()]);

        let admin_password = overrides
            .admin_password
            .or(toml.admin_password)
            .unwrap_or_else(|| {
                warn!("No admin password configured, using the compiled default");
                DEFAULT_ADMIN_PASSWORD.to_string()
            });
        if admin_password.trim().is_empty() {
            return Err(Error::Config("Admin password cannot be empty".to_string()));
        }

        let token_secret = overrides
            .token_secret
            .or(toml.token_secret)
            .filter(|s| !s.trim().is_empty());

        let token_ttl = Duration::from_secs(
            toml.auth.token_ttl_secs.unwrap_or(DEFAULT_TOKEN_TTL_SECS),
        );
        if token_ttl.is_zero() {
            return Err(Error::Config("auth.token_ttl_secs must be positive".to_string()));
        }

        let defaults = MarketSettings::default();
        let market = MarketSettings {
            market_ttl: toml
                .market
                .market_ttl_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.market_ttl),
            prices_ttl: toml
                .market
                .prices_ttl_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.prices_ttl),
            request_timeout: toml
                .market
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        };

        let log_level = toml
            .logging
            .level
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Ok(Self {
            bind_address,
            database_path,
            cors_origins,
            admin_password,
            token_secret,
            token_ttl,
            market,
            log_level,
        })
    }

    /// True when any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

/// Default TOML location: `<config dir>/fomo/fomo-api.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("fomo").join("fomo-api.toml"))
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("fomo").join("fomo.db"))
        .unwrap_or_else(|| PathBuf::from("./fomo_data/fomo.db"))
}

/// Load a TOML config file with graceful degradation
///
/// Missing file → defaults (info). Unreadable or invalid file → defaults (warning).
pub fn load_toml_config(path: &Path) -> TomlConfig {
    if !path.exists() {
        info!("No config file at {}, using defaults", path.display());
        return TomlConfig::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str::<TomlConfig>(&content) {
            Ok(config) => {
                info!("Loaded config file {}", path.display());
                config
            }
            Err(e) => {
                warn!("Invalid config file {}: {}. Using defaults", path.display(), e);
                TomlConfig::default()
            }
        },
        Err(e) => {
            warn!("Failed to read config file {}: {}. Using defaults", path.display(), e);
            TomlConfig::default()
        }
    }
}

/// Resolve which TOML file to read: explicit path, `FOMO_CONFIG`, then the default location
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path()
}
