//! Configuration management for the rebalancer

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

/// ILS web API credentials (client-key flow)
#[derive(Debug, Deserialize, Clone, Default)]
pub struct IlsConfig {
    pub base_url: String,
    pub client_key: String,
    pub client_secret: String,
    /// Patron account the batch holds are placed against
    pub account_id: i64,
}

/// Spreadsheet service access
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SheetsConfig {
    pub api_base: String,
    pub access_token: String,
    /// Shared drive folder the shopping carts are filed under
    pub folder_id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub ils: IlsConfig,
    #[serde(default)]
    pub sheets: SheetsConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix REBALANCER_)
            .add_source(
                Environment::with_prefix("REBALANCER")
                    .separator("__")
                    .try_parsing(true),
            )
            // Override database URL from DATABASE_URL env var if present
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://temp/store.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            ils: IlsConfig::default(),
            sheets: SheetsConfig::default(),
        }
    }
}
