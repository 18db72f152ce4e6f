//! Configuration management for the Fitness RPG storage engine
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: FR__)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub user: UserConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite URL, e.g. `sqlite://fitnessrpg.db` or `sqlite::memory:`
    pub url: String,
    pub max_connections: u32,
}

/// Identity of the local user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    pub id: String,
}

/// Food catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Insert the built-in foods when the catalog is empty
    pub seed_on_startup: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            seed_on_startup: true,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://fitnessrpg.db".to_string(),
                max_connections: 5,
            },
            user: UserConfig {
                id: "demo-user".to_string(),
            },
            catalog: CatalogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with FR__ prefix
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name(&config_file).required(false))
            // e.g., FR__DATABASE__URL=sqlite::memory: sets database.url
            .add_source(config::Environment::with_prefix("FR").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// In-memory configuration for tests and throwaway sessions
    pub fn in_memory() -> Self {
        let mut config = Self::default();
        config.database.url = "sqlite::memory:".to_string();
        config.database.max_connections = 1;
        config
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }
}
