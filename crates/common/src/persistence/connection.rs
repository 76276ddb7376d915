//! # Database Connection Utilities
//!
//! SQLite pool construction with retry on startup and a cheap health probe.

use std::time::Duration;

use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::error::PersistenceError;

/// Connection pool type alias for SQLite
#[cfg(feature = "sqlite")]
pub type SqlitePool = sqlx::SqlitePool;

/// Establish SQLite connection pool
#[cfg(feature = "sqlite")]
pub async fn establish_sqlite_pool(
    config: &DatabaseConfig,
) -> Result<SqlitePool, PersistenceError> {
    use sqlx::sqlite::SqlitePoolOptions;

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .connect(&config.url)
        .await
        .map_err(|e| PersistenceError::ConnectionFailed {
            source: Box::new(e),
        })?;

    info!(
        "SQLite connection pool established with {} max connections",
        config.max_connections
    );

    Ok(pool)
}

/// Establish the SQLite pool, retrying as configured in `config`
#[cfg(feature = "sqlite")]
pub async fn establish_sqlite_pool_with_retry(
    config: &DatabaseConfig,
) -> Result<SqlitePool, PersistenceError> {
    establish_connection_with_retry(
        || establish_sqlite_pool(config),
        config.connect_retries,
        config.connect_retry_delay(),
    )
    .await
}

/// Generic connection establishment with retry logic
///
/// The delay doubles after every failed attempt, capped at 60 seconds.
pub async fn establish_connection_with_retry<F, Fut, T>(
    mut connect_fn: F,
    max_retries: u32,
    initial_delay: Duration,
) -> Result<T, PersistenceError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, PersistenceError>>,
{
    let mut delay = initial_delay;
    let mut attempt = 0;

    loop {
        match connect_fn().await {
            Ok(conn) => return Ok(conn),
            Err(e) if attempt < max_retries => {
                attempt += 1;
                warn!(
                    "Database connection attempt {} failed: {}, retrying in {:?}",
                    attempt, e, delay
                );
                tokio::time::sleep(delay).await;
                delay = std::cmp::min(delay * 2, Duration::from_secs(60));
            }
            Err(e) => return Err(e),
        }
    }
}

/// Test SQLite connection health
#[cfg(feature = "sqlite")]
pub async fn test_sqlite_connection_health(pool: &SqlitePool) -> Result<(), PersistenceError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(|e| PersistenceError::query_failed("SELECT 1", e))?;

    Ok(())
}
