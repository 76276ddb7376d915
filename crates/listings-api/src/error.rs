//! Error types for the listings API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::ListingsError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Main error type for the listings API
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] common::ConfigurationError),

    /// Database error
    #[error("Database error: {0}")]
    Persistence(#[from] common::PersistenceError),

    /// Object storage error
    #[error("Storage error: {0}")]
    Storage(#[from] common::StorageError),

    /// Invalid request
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Not found
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// Property ID kept colliding at insert
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Upload exceeds the configured size limit
    #[error("Payload too large: {message}")]
    PayloadTooLarge { message: String },

    /// Timeout error
    #[error("Request timeout")]
    Timeout,

    /// Internal server error
    #[error("Internal server error: {message}")]
    Internal { message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl ListingsError for Error {}

impl Error {
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Error::NotFound {
            resource: resource.into(),
        }
    }

    /// Get error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config(_) => "LISTINGS_API_CONFIG_ERROR",
            Error::Persistence(_) => "LISTINGS_API_DATABASE_ERROR",
            Error::Storage(_) => "LISTINGS_API_STORAGE_ERROR",
            Error::InvalidRequest { .. } => "LISTINGS_API_INVALID_REQUEST",
            Error::NotFound { .. } => "LISTINGS_API_NOT_FOUND",
            Error::Conflict { .. } => "LISTINGS_API_CONFLICT",
            Error::PayloadTooLarge { .. } => "LISTINGS_API_PAYLOAD_TOO_LARGE",
            Error::Timeout => "LISTINGS_API_TIMEOUT",
            Error::Internal { .. } => "LISTINGS_API_INTERNAL_ERROR",
            Error::Serialization(_) => "LISTINGS_API_SERIALIZATION_ERROR",
            Error::Other(_) => "LISTINGS_API_OTHER_ERROR",
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Persistence(common::PersistenceError::ConnectionFailed { .. })
                | Error::Storage(common::StorageError::UploadFailed { .. })
                | Error::Conflict { .. }
                | Error::Timeout
        )
    }

    /// Check if error is a client error
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidRequest { .. }
                | Error::NotFound { .. }
                | Error::Conflict { .. }
                | Error::PayloadTooLarge { .. }
        )
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Conflict { .. } => StatusCode::CONFLICT,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Timeout => StatusCode::REQUEST_TIMEOUT,
            Error::Persistence(common::PersistenceError::ConnectionFailed { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Error::Storage(_) => StatusCode::BAD_GATEWAY,
            Error::Config(_)
            | Error::Persistence(_)
            | Error::Internal { .. }
            | Error::Serialization(_)
            | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Server-side details stay in the log
        let message = if status.is_server_error() {
            error!(code = self.error_code(), "Request failed: {}", self);
            match &self {
                Error::Storage(_) => "Failed to store media".to_string(),
                _ => "Server error".to_string(),
            }
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "code": self.error_code(),
                "message": message,
                "timestamp": chrono::Utc::now(),
                "retryable": self.is_retryable(),
            }
        }));

        (status, body).into_response()
    }
}

/// Error response structure for API documentation
#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,

    /// Error details
    pub error: ErrorDetails,
}

/// Error details structure
#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorDetails {
    /// Error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// ISO 8601 timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,

    /// Whether the error is retryable
    pub retryable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::not_found("listing RA-COMREPL0001").error_code(),
            "LISTINGS_API_NOT_FOUND"
        );
        assert_eq!(
            Error::Conflict {
                message: "taken".to_string()
            }
            .error_code(),
            "LISTINGS_API_CONFLICT"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::invalid("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::Conflict {
                message: "x".to_string()
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::Persistence(common::PersistenceError::query_failed("SELECT", "boom"))
                .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(Error::Timeout.is_retryable());
        assert!(Error::Conflict {
            message: "x".to_string()
        }
        .is_retryable());
        assert!(!Error::invalid("bad").is_retryable());
    }

    #[test]
    fn test_client_errors() {
        assert!(Error::invalid("bad").is_client_error());
        assert!(Error::not_found("x").is_client_error());
        assert!(!Error::Timeout.is_client_error());
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = Error::invalid("data is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "LISTINGS_API_INVALID_REQUEST");
        assert_eq!(
            body["error"]["message"],
            "Invalid request: data is required"
        );
        assert_eq!(body["error"]["retryable"], false);
    }
}
