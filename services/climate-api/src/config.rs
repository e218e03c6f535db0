//! Service configuration loading and types.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use climate_common::{ClimateError, ClimateResult};
use storage::StoreOptions;

/// Top-level service configuration.
///
/// Layered as defaults, then an optional YAML file, then environment
/// variables, then command-line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Socket address to listen on.
    pub listen: String,

    /// Observation database settings.
    pub database: DatabaseConfig,
}

/// Observation database settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite connection URL, e.g. `sqlite://Resources/hawaii.sqlite`.
    pub url: String,

    /// Upper bound on pooled connections.
    pub max_connections: u32,

    /// Seconds a request waits for a pooled connection.
    pub acquire_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:5000".to_string(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://Resources/hawaii.sqlite".to_string(),
            max_connections: 8,
            acquire_timeout_secs: 5,
        }
    }
}

impl ApiConfig {
    /// Load configuration from a YAML file. Missing keys take defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {:?}", path))?;

        let config: ApiConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse: {:?}", path))?;

        tracing::info!(path = ?path, "Loaded configuration file");
        Ok(config)
    }

    /// Override fields from process environment variables.
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Override fields from `lookup`:
    /// - `DATABASE_URL`
    /// - `CLIMATE_LISTEN_ADDR`
    /// - `CLIMATE_DB_MAX_CONNECTIONS`
    /// - `CLIMATE_DB_ACQUIRE_TIMEOUT_SECS`
    ///
    /// Unparsable numeric values are ignored with a warning.
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(listen) = lookup("CLIMATE_LISTEN_ADDR") {
            self.listen = listen;
        }
        if let Some(raw) = lookup("CLIMATE_DB_MAX_CONNECTIONS") {
            match raw.parse() {
                Ok(n) => self.database.max_connections = n,
                Err(_) => {
                    tracing::warn!(value = %raw, "Ignoring invalid CLIMATE_DB_MAX_CONNECTIONS")
                }
            }
        }
        if let Some(raw) = lookup("CLIMATE_DB_ACQUIRE_TIMEOUT_SECS") {
            match raw.parse() {
                Ok(n) => self.database.acquire_timeout_secs = n,
                Err(_) => {
                    tracing::warn!(value = %raw, "Ignoring invalid CLIMATE_DB_ACQUIRE_TIMEOUT_SECS")
                }
            }
        }
        self
    }

    /// Reject configurations the service cannot start with.
    pub fn validate(&self) -> ClimateResult<()> {
        self.listen_addr()?;

        let url = self.database.url.trim();
        if url.is_empty() {
            return Err(ClimateError::ConfigError("database URL is empty".to_string()));
        }
        if !url.starts_with("sqlite:") {
            return Err(ClimateError::ConfigError(format!(
                "unsupported database URL '{}': expected a sqlite: URL",
                url
            )));
        }
        if self.database.max_connections == 0 {
            return Err(ClimateError::ConfigError(
                "max_connections must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Parsed listen address.
    pub fn listen_addr(&self) -> ClimateResult<SocketAddr> {
        self.listen.parse().map_err(|e| {
            ClimateError::ConfigError(format!("invalid listen address '{}': {}", self.listen, e))
        })
    }

    /// Pool settings for the observation store.
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            max_connections: self.database.max_connections,
            acquire_timeout: Duration::from_secs(self.database.acquire_timeout_secs),
        }
    }
}
