//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use cue_bracket::BracketConfig;
use cue_bracket::db::DatabaseConfig;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;

/// Default bind address
pub const DEFAULT_BIND: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 8080));

/// Where tournaments and brackets are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    /// Process memory; everything is lost on restart
    Memory,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreKind::Postgres),
            "memory" => Ok(StoreKind::Memory),
            other => Err(format!("expected 'postgres' or 'memory', got '{other}'")),
        }
    }
}

/// Defaults applied to bracket requests that leave these fields out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketDefaults {
    pub tables_per_bracket: u32,
    pub race_to: u32,
}

impl Default for BracketDefaults {
    fn default() -> Self {
        let config = BracketConfig::default();
        Self {
            tables_per_bracket: config.tables_per_bracket,
            race_to: config.uppers_race_to,
        }
    }
}

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub store: StoreKind,
    pub database: DatabaseConfig,
    /// Prometheus scrape address; metrics are off when unset
    pub metrics_bind: Option<SocketAddr>,
    pub bracket_defaults: BracketDefaults,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Bind address from the command line
    /// * `database_url_override` - Database URL from the command line
    /// * `memory` - Force the in-memory store
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but cannot be parsed
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        memory: bool,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_env("SERVER_BIND")?.unwrap_or(DEFAULT_BIND),
        };

        let store = if memory {
            StoreKind::Memory
        } else {
            parse_env("STORE")?.unwrap_or(StoreKind::Postgres)
        };

        let mut database = DatabaseConfig::from_env();
        if let Some(url) = database_url_override {
            database.database_url = url;
        }

        let metrics_bind = parse_env("METRICS_BIND")?;

        let defaults = BracketDefaults::default();
        let bracket_defaults = BracketDefaults {
            tables_per_bracket: parse_env("DEFAULT_TABLES_PER_BRACKET")?
                .unwrap_or(defaults.tables_per_bracket),
            race_to: parse_env("DEFAULT_RACE_TO")?.unwrap_or(defaults.race_to),
        };

        Ok(ServerConfig {
            bind,
            store,
            database,
            metrics_bind,
            bracket_defaults,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bracket_defaults.tables_per_bracket == 0 {
            return Err(ConfigError::Invalid {
                var: "DEFAULT_TABLES_PER_BRACKET".to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        if self.bracket_defaults.race_to == 0 {
            return Err(ConfigError::Invalid {
                var: "DEFAULT_RACE_TO".to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        if self.store == StoreKind::Postgres {
            if self.database.database_url.is_empty() {
                return Err(ConfigError::MissingRequired {
                    var: "DATABASE_URL".to_string(),
                    hint: "Set a PostgreSQL URL or run with --memory".to_string(),
                });
            }

            if self.database.min_connections > self.database.max_connections {
                return Err(ConfigError::Invalid {
                    var: "DB_MIN_CONNECTIONS".to_string(),
                    reason: format!(
                        "Cannot exceed DB_MAX_CONNECTIONS ({})",
                        self.database.max_connections
                    ),
                });
            }
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: "Must differ from SERVER_BIND".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse an optional environment variable, rejecting values that do not parse
fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().map(Some).map_err(|e: T::Err| ConfigError::Invalid {
            var: key.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ServerConfig {
        ServerConfig {
            bind: "127.0.0.1:8080".parse().unwrap(),
            store: StoreKind::Memory,
            database: DatabaseConfig::development(),
            metrics_bind: None,
            bracket_defaults: BracketDefaults::default(),
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "DATABASE_URL".to_string(),
            hint: "Use --memory".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("DATABASE_URL"));
        assert!(msg.contains("Use --memory"));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_zero_tables_rejected() {
        let mut config = config();
        config.bracket_defaults.tables_per_bracket = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { var, .. }) if var == "DEFAULT_TABLES_PER_BRACKET"
        ));
    }

    #[test]
    fn test_pool_bounds_checked_for_postgres() {
        let mut config = config();
        config.store = StoreKind::Postgres;
        config.database.min_connections = 50;
        config.database.max_connections = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_metrics_port_must_differ() {
        let mut config = config();
        config.metrics_bind = Some(config.bind);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_store_kind_parsing() {
        assert_eq!("memory".parse::<StoreKind>(), Ok(StoreKind::Memory));
        assert_eq!("Postgres".parse::<StoreKind>(), Ok(StoreKind::Postgres));
        assert!("sqlite".parse::<StoreKind>().is_err());
    }
}
