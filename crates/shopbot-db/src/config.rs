//! Store configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                      | Default                           |
//! |-------------------------------|-----------------------------------|
//! | `SHOPBOT_DB_PATH`             | `./shopbot.db`                    |
//! | `SHOPBOT_DB_MAX_CONNECTIONS`  | `5`                               |
//! | `SHOPBOT_RUN_MIGRATIONS`      | `true`                            |
//! | `SHOPBOT_DEFAULT_QRCODE_URL`  | `https://promptpay.io/1234567890` |
//! | `SHOPBOT_DEFAULT_THANK_YOU`   | built-in thank-you message        |

use serde::{Deserialize, Serialize};
use std::env;

use crate::pool::DbConfig;
use crate::repository::settings::SettingDefaults;

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file
    pub database_path: String,

    /// Pool size upper bound
    pub max_connections: u32,

    /// Apply the bootstrap schema on connect
    pub run_migrations: bool,

    /// Values served before a setting has been saved
    pub setting_defaults: SettingDefaults,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SettingDefaults::default();

        let config = StoreConfig {
            database_path: lookup("SHOPBOT_DB_PATH")
                .unwrap_or_else(|| "./shopbot.db".to_string()),

            max_connections: lookup("SHOPBOT_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SHOPBOT_DB_MAX_CONNECTIONS".to_string()))?,

            run_migrations: lookup("SHOPBOT_RUN_MIGRATIONS")
                .unwrap_or_else(|| "true".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SHOPBOT_RUN_MIGRATIONS".to_string()))?,

            setting_defaults: SettingDefaults {
                qrcode_url: lookup("SHOPBOT_DEFAULT_QRCODE_URL")
                    .unwrap_or(defaults.qrcode_url),
                thank_you_message: lookup("SHOPBOT_DEFAULT_THANK_YOU")
                    .unwrap_or(defaults.thank_you_message),
            },
        };

        if config.database_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("SHOPBOT_DB_PATH".to_string()));
        }

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue("SHOPBOT_DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }

    /// Builds the pool configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .run_migrations(self.run_migrations)
            .setting_defaults(self.setting_defaults.clone())
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
