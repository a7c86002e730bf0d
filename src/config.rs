use std::path::Path;

use serde::Deserialize;

use crate::error::{JsonQueryError, Result};

/// Prefix of environment variables overriding configuration
pub const ENV_PREFIX: &str = "JSON_QUERY";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JsonQueryConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// Upper bound for requested page sizes; 0 disables the cap
    pub max_page_size: u64,
    /// Log the rendered query of every assembled result
    pub log_queries: bool,
}

impl Default for JsonQueryConfig {
    fn default() -> Self {
        Self {
            database_url: "postgresql://localhost/json_query_development".to_string(),
            max_connections: 10,
            max_page_size: 0,
            log_queries: false,
        }
    }
}

impl JsonQueryConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(db_url) = std::env::var("DATABASE_URL") {
            config.database_url = db_url;
        }

        if let Ok(max_connections) = std::env::var("JSON_QUERY_MAX_CONNECTIONS") {
            config.max_connections = max_connections.parse().map_err(|e| {
                JsonQueryError::Configuration(format!("Invalid max_connections: {e}"))
            })?;
        }

        if let Ok(max_page_size) = std::env::var("JSON_QUERY_MAX_PAGE_SIZE") {
            config.max_page_size = max_page_size.parse().map_err(|e| {
                JsonQueryError::Configuration(format!("Invalid max_page_size: {e}"))
            })?;
        }

        if let Ok(log_queries) = std::env::var("JSON_QUERY_LOG_QUERIES") {
            config.log_queries = log_queries.parse().map_err(|e| {
                JsonQueryError::Configuration(format!("Invalid log_queries: {e}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Layer a configuration file (TOML, YAML or JSON by extension) under
    /// `JSON_QUERY_*` environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database_url.is_empty() {
            return Err(JsonQueryError::Configuration(
                "database_url must not be empty".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(JsonQueryError::Configuration(
                "max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
