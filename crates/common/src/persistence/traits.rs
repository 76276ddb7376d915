//! # Persistence Traits
//!
//! Lifecycle hooks every store implements so the server can bring them up
//! uniformly.

use async_trait::async_trait;

use crate::error::PersistenceError;

/// Schema setup run once at startup
#[async_trait]
pub trait Migrate: Send + Sync {
    /// Create tables and indexes if they do not exist yet
    async fn run_migrations(&self) -> Result<(), PersistenceError>;
}

/// Liveness probe used by the health endpoint
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn health_check(&self) -> Result<(), PersistenceError>;
}
