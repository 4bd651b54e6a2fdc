//! Configuration management for the inventory management backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with IMS_ prefix

use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Persistence backend selection
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Which store implementation backs the service
    pub backend: StoreBackend,

    /// Deadline in seconds for each individual store call
    pub timeout_secs: u64,
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("IMS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.url", "postgres://localhost/ims")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("store.backend", "postgres")?
            .set_default("store.timeout_secs", 10)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (IMS_ prefix)
            .add_source(
                Environment::with_prefix("IMS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Configuration for tests and local runs without a database
    pub fn in_memory() -> Self {
        Self {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 1,
                min_connections: 0,
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                timeout_secs: 5,
            },
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
