//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//! A `.env` file in the working directory is read first when present.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use till_core::DEFAULT_CATEGORY;
use till_db::DbConfig;

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: IpAddr,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub db_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// Category given to articles and services created without one
    pub default_category: String,

    /// Allow any origin (the register UI is usually served elsewhere)
    pub cors_allow_any: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 3000,
            db_path: PathBuf::from("./till.db"),
            db_max_connections: 5,
            default_category: DEFAULT_CATEGORY.to_string(),
            cors_allow_any: true,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = ServerConfig::default();

        let config = ServerConfig {
            host: parse_var("TILL_HOST", defaults.host)?,
            port: parse_var("TILL_PORT", defaults.port)?,
            db_path: env::var("TILL_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            db_max_connections: parse_var("TILL_DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            default_category: env::var("TILL_DEFAULT_CATEGORY")
                .map(|c| c.trim().to_string())
                .unwrap_or(defaults.default_category),
            cors_allow_any: parse_var("TILL_CORS_ALLOW_ANY", defaults.cors_allow_any)?,
        };

        if config.default_category.is_empty() {
            return Err(ConfigError::MissingRequired("TILL_DEFAULT_CATEGORY".to_string()));
        }
        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("TILL_DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.db_path.clone()).max_connections(self.db_max_connections)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.addr().to_string(), "0.0.0.0:3000");
        assert_eq!(config.default_category, "outros");
        assert!(config.cors_allow_any);
    }

    #[test]
    fn test_parse_var_falls_back_when_unset() {
        let port: u16 = parse_var("TILL_TEST_UNSET_PORT", 8080).unwrap();
        assert_eq!(port, 8080);
    }
}
