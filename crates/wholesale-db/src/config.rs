//! # Application Configuration
//!
//! Where the database lives, how the pool is sized, and the ledger
//! settings handed to the core.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`WHOLESALE_*`)
//! 2. Config file (`wholesale.toml`, or the path in `WHOLESALE_CONFIG`)
//! 3. Defaults (this file)
//!
//! ## Example `wholesale.toml`
//! ```toml
//! database_path = "/var/lib/wholesale/wholesale.db"
//! max_conflict_retries = 3
//!
//! [ledger]
//! store_name = "Karachi Wholesale"
//! currency_symbol = "RS"
//! low_stock_threshold = 50
//! allow_negative_stock = false
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use wholesale_core::LedgerSettings;

use crate::error::{DbError, DbResult};
use crate::pool::DbConfig;

pub const ENV_CONFIG_PATH: &str = "WHOLESALE_CONFIG";
pub const ENV_DB_PATH: &str = "WHOLESALE_DB_PATH";
pub const ENV_STORE_NAME: &str = "WHOLESALE_STORE_NAME";
pub const ENV_CURRENCY_SYMBOL: &str = "WHOLESALE_CURRENCY_SYMBOL";
pub const ENV_LOW_STOCK_THRESHOLD: &str = "WHOLESALE_LOW_STOCK_THRESHOLD";
pub const ENV_ALLOW_NEGATIVE_STOCK: &str = "WHOLESALE_ALLOW_NEGATIVE_STOCK";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file holding the ledger slots.
    pub database_path: PathBuf,

    /// Pool size. Default: 5
    pub max_connections: u32,

    /// Default: 1
    pub min_connections: u32,

    /// How many times a session reloads and re-applies a transition after
    /// another writer saved first. Default: 3
    pub max_conflict_retries: u32,

    /// Settings passed to the ledger core.
    pub ledger: LedgerSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: Self::default_database_path(),
            max_connections: 5,
            min_connections: 1,
            max_conflict_retries: 3,
            ledger: LedgerSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, else `WHOLESALE_CONFIG`, else the
    ///    platform config dir)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> DbResult<Self> {
        let path = config_path
            .or_else(|| std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from))
            .or_else(Self::default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> DbResult<Self> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DbError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> DbResult<Self> {
        toml::from_str(contents).map_err(|e| DbError::Config(e.to_string()))
    }

    /// Applies `WHOLESALE_*` overrides read through `lookup`.
    ///
    /// Values that don't parse are ignored with a warning.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DB_PATH) {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = PathBuf::from(path);
        }

        if let Some(name) = lookup(ENV_STORE_NAME) {
            self.ledger.store_name = name;
        }

        if let Some(symbol) = lookup(ENV_CURRENCY_SYMBOL) {
            self.ledger.currency_symbol = symbol;
        }

        if let Some(raw) = lookup(ENV_LOW_STOCK_THRESHOLD) {
            match raw.trim().parse::<i64>() {
                Ok(threshold) => self.ledger.low_stock_threshold = threshold,
                Err(_) => warn!(value = %raw, "Ignoring invalid {}", ENV_LOW_STOCK_THRESHOLD),
            }
        }

        if let Some(raw) = lookup(ENV_ALLOW_NEGATIVE_STOCK) {
            match raw.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => self.ledger.allow_negative_stock = true,
                "0" | "false" | "no" => self.ledger.allow_negative_stock = false,
                _ => warn!(value = %raw, "Ignoring invalid {}", ENV_ALLOW_NEGATIVE_STOCK),
            }
        }
    }

    pub fn validate(&self) -> DbResult<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(DbError::Config("database_path must not be empty".into()));
        }
        if self.max_connections == 0 {
            return Err(DbError::Config(
                "max_connections must be greater than 0".into(),
            ));
        }
        if self.ledger.currency_decimals > 8 {
            return Err(DbError::Config(
                "currency_decimals must be at most 8".into(),
            ));
        }
        Ok(())
    }

    /// Pool configuration derived from this config.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .min_connections(self.min_connections.min(self.max_connections))
    }

    /// `wholesale.toml` in the platform config directory.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "wholesale", "pos")
            .map(|dirs| dirs.config_dir().join("wholesale.toml"))
    }

    /// `wholesale.db` in the platform data directory, else the working directory.
    pub fn default_database_path() -> PathBuf {
        directories::ProjectDirs::from("com", "wholesale", "pos")
            .map(|dirs| dirs.data_dir().join("wholesale.db"))
            .unwrap_or_else(|| PathBuf::from("./wholesale.db"))
    }
}
