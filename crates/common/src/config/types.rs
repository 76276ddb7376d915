//! # Configuration Types
//!
//! Configuration sections shared by every listings component.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ConfigurationError, ListingsError};

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL (e.g. `sqlite:listings.db?mode=rwc`)
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub connect_timeout: u64,

    /// Idle timeout for connections in seconds
    pub idle_timeout: Option<u64>,

    /// Maximum lifetime for connections in seconds
    pub max_lifetime: Option<u64>,

    /// Whether to run migrations on startup
    pub run_migrations: bool,

    /// Extra attempts to open the pool at startup
    pub connect_retries: u32,

    /// Delay before the first retry in milliseconds, doubled per retry
    pub connect_retry_delay_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:listings.db?mode=rwc".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: 30,
            idle_timeout: Some(600),
            max_lifetime: Some(3600),
            run_migrations: true,
            connect_retries: 3,
            connect_retry_delay_ms: 500,
        }
    }
}

impl DatabaseConfig {
    /// In-memory SQLite database, for tests and local experiments
    ///
    /// Every SQLite in-memory connection is its own database, so the pool is
    /// pinned to a single connection.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            idle_timeout: None,
            max_lifetime: None,
            ..Self::default()
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout.map(Duration::from_secs)
    }

    pub fn max_lifetime(&self) -> Option<Duration> {
        self.max_lifetime.map(Duration::from_secs)
    }

    pub fn connect_retry_delay(&self) -> Duration {
        Duration::from_millis(self.connect_retry_delay_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,

    /// Include source file and line in log records
    pub with_source_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            with_source_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// Common configuration validation trait
pub trait ConfigValidation {
    type Error: ListingsError;

    /// Validate the configuration
    fn validate(&self) -> Result<(), Self::Error>;

    /// Get configuration warnings (non-fatal issues)
    fn warnings(&self) -> Vec<String> {
        Vec::new()
    }
}

impl ConfigValidation for DatabaseConfig {
    type Error = ConfigurationError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.url.is_empty() {
            return Err(ConfigurationError::InvalidValue {
                key: "database.url".to_string(),
                value: self.url.clone(),
                reason: "Database URL cannot be empty".to_string(),
            });
        }

        if !self.url.starts_with("sqlite:") {
            return Err(ConfigurationError::InvalidValue {
                key: "database.url".to_string(),
                value: self.url.clone(),
                reason: "Only sqlite URLs are supported".to_string(),
            });
        }

        if self.max_connections == 0 {
            return Err(ConfigurationError::InvalidValue {
                key: "database.max_connections".to_string(),
                value: self.max_connections.to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigurationError::InvalidValue {
                key: "database.min_connections".to_string(),
                value: self.min_connections.to_string(),
                reason: "Cannot be greater than max_connections".to_string(),
            });
        }

        Ok(())
    }

    fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.url.contains(":memory:") && self.max_connections > 1 {
            warnings.push(
                "In-memory SQLite with more than one pooled connection gives each connection its own database"
                    .to_string(),
            );
        }

        warnings
    }
}

impl ConfigValidation for LoggingConfig {
    type Error = ConfigurationError;

    fn validate(&self) -> Result<(), Self::Error> {
        match self.format.to_lowercase().as_str() {
            "json" | "pretty" => Ok(()),
            other => Err(ConfigurationError::InvalidValue {
                key: "logging.format".to_string(),
                value: other.to_string(),
                reason: "Expected 'json' or 'pretty'".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_validation() {
        let config = DatabaseConfig::default();
        assert!(config.validate().is_ok());

        let config = DatabaseConfig {
            url: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DatabaseConfig {
            url: "postgres://localhost/listings".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DatabaseConfig {
            min_connections: 20,
            max_connections: 10,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_in_memory_database_is_single_connection() {
        let config = DatabaseConfig::in_memory();
        assert_eq!(config.max_connections, 1);
        assert!(config.validate().is_ok());
        assert!(config.warnings().is_empty());

        let config = DatabaseConfig {
            max_connections: 4,
            ..DatabaseConfig::in_memory()
        };
        assert_eq!(config.warnings().len(), 1);
    }

    #[test]
    fn test_duration_accessors() {
        let config = DatabaseConfig::default();
        assert_eq!(config.connect_timeout(), Duration::from_secs(30));
        assert_eq!(config.idle_timeout(), Some(Duration::from_secs(600)));
        assert_eq!(config.max_lifetime(), Some(Duration::from_secs(3600)));
        assert_eq!(config.connect_retries, 3);
        assert_eq!(config.connect_retry_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_logging_config_validation() {
        let config = LoggingConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.is_json());

        let config = LoggingConfig {
            format: "JSON".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(config.is_json());

        let config = LoggingConfig {
            format: "xml".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
