//! Configuration module for the listings API

mod allocator;
mod media;
mod server;
mod telemetry;

pub use allocator::AllocatorConfig;
pub use media::{MediaBackend, MediaConfig, DEFAULT_MAX_FILE_SIZE};
pub use server::ServerConfig;
pub use telemetry::TelemetryConfig;

use common::config::{ConfigLoader, ConfigValidation, DatabaseConfig, LoggingConfig};
use common::ConfigurationError as ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Main configuration structure for the listings API
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// SQLite document store
    pub database: DatabaseConfig,

    /// Property ID allocation
    pub allocator: AllocatorConfig,

    /// Media uploads and object storage
    pub media: MediaConfig,

    /// Log output
    pub logging: LoggingConfig,

    /// Metrics exposition
    pub telemetry: TelemetryConfig,
}

impl ConfigLoader for Config {
    const ENV_PREFIX: &'static str = "LISTINGS_API";
    const DEFAULT_FILE: &'static str = "listings-api.toml";
}

impl Config {
    /// Load configuration from file and environment, then validate it
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = <Config as ConfigLoader>::load(config_path.map(Path::to_path_buf))?;
        config.validate()?;
        Ok(config)
    }

    /// Log every non-fatal configuration issue
    pub fn log_warnings(&self) {
        for warning in self.warnings() {
            warn!("Configuration warning: {}", warning);
        }
    }

    /// Generate example configuration file
    pub fn generate_example() -> Result<String, ConfigError> {
        let config = Self::default();
        toml::to_string_pretty(&config).map_err(|e| ConfigError::ParseError {
            details: format!("Failed to serialize config: {e}"),
        })
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.logging.validate()?;

        if self.server.request_timeout == 0 {
            return Err(ConfigError::InvalidValue {
                key: "server.request_timeout".to_string(),
                value: "0".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.allocator.insert_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "allocator.insert_attempts".to_string(),
                value: "0".to_string(),
                reason: "At least one insert attempt is required".to_string(),
            });
        }

        if self.media.max_file_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "media.max_file_size".to_string(),
                value: "0".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if let MediaBackend::Aws { bucket, region } = &self.media.backend {
            if bucket.is_empty() || region.is_empty() {
                return Err(ConfigError::MissingRequired {
                    key: "media.backend.bucket / media.backend.region".to_string(),
                });
            }
        }

        if !self.telemetry.metrics_path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                key: "telemetry.metrics_path".to_string(),
                value: self.telemetry.metrics_path.clone(),
                reason: "Must start with '/'".to_string(),
            });
        }

        Ok(())
    }

    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = self.database.warnings();

        if self.allocator.max_attempts == 0 {
            warnings.push("allocator.max_attempts is 0; one attempt will be made".to_string());
        }

        if self.media.backend == MediaBackend::InMemory {
            warnings.push("Media uploads use the in-memory store and are lost on restart".to_string());
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.bind_address.port(), 8000);
        assert_eq!(config.allocator.max_attempts, 5);
        assert_eq!(config.allocator.insert_attempts, 5);
        assert_eq!(config.media.max_file_size, 150 * 1024 * 1024);
        assert_eq!(config.media.backend, MediaBackend::InMemory);
        assert!(config.telemetry.enable_metrics);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(config.server.bind_address, deserialized.server.bind_address);
        assert_eq!(config.database.url, deserialized.database.url);
        assert_eq!(config.media.backend, deserialized.media.backend);
    }

    #[test]
    fn test_generate_example_parses_back() {
        let example = Config::generate_example().unwrap();
        assert!(example.contains("[allocator]"));
        assert!(toml::from_str::<Config>(&example).is_ok());
    }

    #[test]
    fn test_duration_conversions() {
        let config = Config::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_file_and_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "listings-api.toml",
                r#"
                [server]
                request_timeout = 10

                [allocator]
                max_attempts = 8

                [media.backend]
                type = "Aws"
                bucket = "estate-media"
                region = "ap-south-1"
                "#,
            )?;
            jail.set_env("LISTINGS_API_ALLOCATOR__INSERT_ATTEMPTS", "3");
            jail.set_env("LISTINGS_API_SERVER__REQUEST_TIMEOUT", "45");

            let config = Config::load(None).expect("config should load");
            assert_eq!(config.server.request_timeout, 45);
            assert_eq!(config.allocator.max_attempts, 8);
            assert_eq!(config.allocator.insert_attempts, 3);
            assert_eq!(
                config.media.backend,
                MediaBackend::Aws {
                    bucket: "estate-media".to_string(),
                    region: "ap-south-1".to_string(),
                }
            );
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.allocator.insert_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.media.backend = MediaBackend::Aws {
            bucket: String::new(),
            region: "us-east-1".to_string(),
        };
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.telemetry.metrics_path = "metrics".to_string();
        assert!(config.validate().is_err());
    }
}
