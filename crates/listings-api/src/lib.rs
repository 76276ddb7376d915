//! # Estate Listings API
//!
//! HTTP service for commercial and residential property listings.
//!
//! ## Features
//!
//! - **Sequential property IDs**: one `<PREFIX><NNNN>` namespace per listing
//!   category, backed by a unique key and insert retry
//! - **Listings**: JSON documents with filtered, paginated reads and
//!   deep-merge updates
//! - **Media**: photo and video uploads to S3, a local directory or memory
//! - **Blogs**: view, like and comment counters with per-author statistics
//! - **OpenAPI Documentation**: generated with utoipa
//! - **Monitoring**: Prometheus metrics and structured tracing

pub mod api;
pub mod blogs;
pub mod config;
pub mod error;
pub mod listings;
pub mod media;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use server::{AppState, Server};

/// Version of the listings-api crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol version for API compatibility
pub const API_VERSION: &str = "v1";
