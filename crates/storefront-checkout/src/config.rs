//! Checkout configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                         | Default                          |
//! |----------------------------------|----------------------------------|
//! | `STOREFRONT_DATABASE_PATH`       | `./storefront.db`                |
//! | `STOREFRONT_DB_MAX_CONNECTIONS`  | `5`                              |
//! | `STOREFRONT_DB_BUSY_TIMEOUT_MS`  | `5000`                           |
//! | `STOREFRONT_LOG`                 | `info,storefront=debug,sqlx=warn`|

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use storefront_db::DbConfig;

/// Filter used when neither `STOREFRONT_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "info,storefront=debug,sqlx=warn";

/// Checkout configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// SQLite file, or `:memory:` for a throwaway database
    pub database_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// How long a redeem waits on the write lock (milliseconds)
    pub db_busy_timeout_ms: u64,

    /// `EnvFilter` directive string
    pub log_filter: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        CheckoutConfig {
            database_path: PathBuf::from("./storefront.db"),
            db_max_connections: 5,
            db_busy_timeout_ms: 5_000,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl CheckoutConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// `load()` passes the process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = CheckoutConfig::default();

        let config = CheckoutConfig {
            database_path: lookup("STOREFRONT_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            db_max_connections: parse_or(
                &lookup,
                "STOREFRONT_DB_MAX_CONNECTIONS",
                defaults.db_max_connections,
            )?,

            db_busy_timeout_ms: parse_or(
                &lookup,
                "STOREFRONT_DB_BUSY_TIMEOUT_MS",
                defaults.db_busy_timeout_ms,
            )?,

            log_filter: lookup("STOREFRONT_LOG")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_filter),
        };

        if config.database_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired(
                "STOREFRONT_DATABASE_PATH".to_string(),
            ));
        }

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "STOREFRONT_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Pool settings for [`storefront_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        let busy = Duration::from_millis(self.db_busy_timeout_ms);
        if self.database_path.as_os_str() == ":memory:" {
            return DbConfig::in_memory().busy_timeout(busy);
        }

        DbConfig::new(&self.database_path)
            .max_connections(self.db_max_connections)
            .busy_timeout(busy)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
