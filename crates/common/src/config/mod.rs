//! # Configuration Abstractions
//!
//! Layered configuration loading plus the database and logging sections
//! shared by every listings component.

pub mod loader;
pub mod traits;
pub mod types;

pub use loader::{load_config_with_options, validate_config_file, LoadOptions};
pub use traits::ConfigLoader;
pub use types::*;
