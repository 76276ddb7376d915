//! # Common
//!
//! Shared building blocks for the estate listings service: error types,
//! configuration loading, structured logging, SQLite persistence helpers and
//! the sequential property ID allocator.

pub mod config;
pub mod error;
pub mod journal;
pub mod metrics;
pub mod persistence;
pub mod property_id;

pub use config::*;
pub use error::*;

pub use persistence::traits as persistence_traits;
pub use persistence::{Page, PageRequest, Pagination};
pub use property_id::{IdScheme, IdentifierLookup, PropertyId, PropertyPrefix, SequentialIdAllocator};

/// Version of the common crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert!(VERSION.chars().any(|c| c.is_ascii_digit()));
    }
}
