//! Error handling for the estate listings service
//!
//! This module defines the error families shared by every crate in the
//! workspace:
//! - `ListingsError` marker trait for consistent error handling
//! - `ConfigurationError` for configuration loading and validation
//! - `PersistenceError` for database operations
//! - `StorageError` for object storage (media uploads)
//!
//! Library code uses thiserror; binaries wrap these with anyhow where needed.

use thiserror::Error;

/// Base trait for all listings-specific errors
///
/// Ensures every error is thread-safe, `'static` and implements the standard
/// `Error` trait so it can cross async boundaries.
pub trait ListingsError: std::error::Error + Send + Sync + 'static {}

/// Configuration-related errors
///
/// These errors occur during configuration loading, parsing, or validation.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Configuration file cannot be read
    #[error("Cannot read configuration file {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration parsing failed
    #[error("Failed to parse configuration: {details}")]
    ParseError { details: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for {key}: {value} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// Missing required configuration
    #[error("Missing required configuration: {key}")]
    MissingRequired { key: String },

    /// Environment variable error
    #[error("Environment variable error for {var}: {details}")]
    EnvironmentError { var: String, details: String },

    /// Configuration validation failed
    #[error("Configuration validation failed: {details}")]
    ValidationFailed { details: String },
}

impl ListingsError for ConfigurationError {}

/// Database and persistence-related errors
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Database connection failed
    #[error("Database connection failed: {source}")]
    ConnectionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Database query failed
    #[error("Database query failed: {query}: {details}")]
    QueryFailed { query: String, details: String },

    /// Database migration failed
    #[error("Database migration failed: {details}")]
    MigrationFailed { details: String },

    /// Serialization failed
    #[error("Serialization failed: {details}")]
    SerializationFailed { details: String },

    /// Deserialization failed
    #[error("Deserialization failed: {details}")]
    DeserializationFailed { details: String },

    /// Constraint violation
    #[error("Database constraint violation: {constraint}")]
    ConstraintViolation { constraint: String },

    /// Record not found
    #[error("Record not found: {details}")]
    NotFound { details: String },
}

impl ListingsError for PersistenceError {}

/// Object storage errors raised while storing media
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend could not be constructed from configuration
    #[error("Storage backend configuration error: {details}")]
    Configuration { details: String },

    /// Upload of a single object failed
    #[error("Failed to upload {key}: {details}")]
    UploadFailed { key: String, details: String },

    /// Read of a single object failed
    #[error("Failed to read {key}: {details}")]
    ReadFailed { key: String, details: String },

    /// Delete of a single object failed
    #[error("Failed to delete {key}: {details}")]
    DeleteFailed { key: String, details: String },
}

impl ListingsError for StorageError {}

impl ConfigurationError {
    /// Create a validation failed error
    pub fn validation_failed(details: impl Into<String>) -> Self {
        Self::ValidationFailed {
            details: details.into(),
        }
    }
}

impl PersistenceError {
    /// Wrap a failed query, keeping the driver message
    pub fn query_failed(query: impl Into<String>, source: impl std::fmt::Display) -> Self {
        Self::QueryFailed {
            query: query.into(),
            details: source.to_string(),
        }
    }

    /// Whether the error is a uniqueness/constraint violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation { .. })
    }
}

#[cfg(feature = "sqlite")]
impl PersistenceError {
    /// Classify a sqlx error, separating unique violations from other failures
    pub fn from_sqlx(query: impl Into<String>, err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::ConstraintViolation {
                    constraint: db_err.message().to_string(),
                };
            }
        }
        Self::query_failed(query, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ConfigurationError::FileNotFound {
            path: "/etc/listings.toml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /etc/listings.toml"
        );

        let error = PersistenceError::query_failed("SELECT 1", "disk I/O error");
        assert_eq!(
            error.to_string(),
            "Database query failed: SELECT 1: disk I/O error"
        );
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error as _;

        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = PersistenceError::ConnectionFailed {
            source: Box::new(io_error),
        };
        assert!(error.source().is_some());
    }

    #[test]
    fn test_listings_error_trait() {
        fn assert_listings_error(_: impl ListingsError) {}

        assert_listings_error(ConfigurationError::validation_failed("bad"));
        assert_listings_error(PersistenceError::NotFound {
            details: "x".to_string(),
        });
        assert_listings_error(StorageError::Configuration {
            details: "x".to_string(),
        });
    }

    #[test]
    fn test_constraint_violation_detection() {
        let violation = PersistenceError::ConstraintViolation {
            constraint: "UNIQUE constraint failed: listings.property_id".to_string(),
        };
        assert!(violation.is_constraint_violation());
        assert!(!PersistenceError::query_failed("q", "e").is_constraint_violation());
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_from_sqlx_detects_unique_violation() {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query("CREATE TABLE t (id TEXT PRIMARY KEY)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO t (id) VALUES ('a')")
            .execute(&pool)
            .await
            .unwrap();

        let err = sqlx::query("INSERT INTO t (id) VALUES ('a')")
            .execute(&pool)
            .await
            .unwrap_err();

        assert!(PersistenceError::from_sqlx("insert", err).is_constraint_violation());
    }
}
