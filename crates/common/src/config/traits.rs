//! # Configuration Traits
//!
//! Layered configuration loading shared by every binary in the workspace.

use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

use crate::config::loader::{load_config_with_options, LoadOptions};
use crate::error::ConfigurationError;

/// Configuration loader trait
///
/// Implementors only name their environment prefix and default file; the
/// layering (defaults -> TOML file -> environment) is shared.
pub trait ConfigLoader: Default + Serialize + DeserializeOwned + Send + Sync {
    /// Environment variable prefix without the trailing underscore
    const ENV_PREFIX: &'static str;

    /// File name looked up in the working directory when no path is given
    const DEFAULT_FILE: &'static str;

    /// Load configuration with optional path override
    ///
    /// A missing default file is not an error; compiled defaults apply.
    fn load(path_override: Option<PathBuf>) -> Result<Self, ConfigurationError> {
        let (config_path, require_file) = match path_override {
            Some(path) => (path, true),
            None => (PathBuf::from(Self::DEFAULT_FILE), false),
        };

        load_config_with_options(LoadOptions {
            config_path: Some(config_path),
            env_prefix: Self::ENV_PREFIX.to_string(),
            require_file,
        })
    }

    /// Load configuration from a specific file, which must exist
    fn load_from_file(path: &Path) -> Result<Self, ConfigurationError> {
        Self::load(Some(path.to_path_buf()))
    }

    /// Apply environment variable overrides on top of an existing value
    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigurationError> {
        use figment::{
            providers::{Env, Serialized},
            Figment,
        };

        let figment = Figment::from(Serialized::defaults(&*self))
            .merge(Env::prefixed(&format!("{prefix}_")).split("__"));

        *self = figment
            .extract()
            .map_err(|err| ConfigurationError::ParseError {
                details: format!("Failed to apply environment overrides: {err}"),
            })?;

        Ok(())
    }
}
