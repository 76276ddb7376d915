//! # Configuration Loader
//!
//! Figment-based configuration loading with layered support:
//! 1. Compiled defaults
//! 2. TOML configuration file
//! 3. Environment variable overrides
//!
//! Nested fields map to environment variables with a double underscore:
//! `LISTINGS_API_DATABASE__URL` sets `database.url`.

use crate::error::ConfigurationError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable prefix used when none is supplied
pub const DEFAULT_ENV_PREFIX: &str = "LISTINGS";

/// Configuration loading options
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Optional path to configuration file
    pub config_path: Option<PathBuf>,
    /// Environment variable prefix
    pub env_prefix: String,
    /// Whether configuration file is required
    pub require_file: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            config_path: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            require_file: false,
        }
    }
}

/// Load configuration with custom options
pub fn load_config_with_options<T>(options: LoadOptions) -> Result<T, ConfigurationError>
where
    T: Default + DeserializeOwned + serde::Serialize,
{
    debug!("Loading configuration with options: {:?}", options);

    let mut figment = Figment::new().merge(Serialized::defaults(T::default()));

    if let Some(path) = &options.config_path {
        if path.exists() {
            info!("Loading configuration from file: {}", path.display());
            figment = add_file_provider(figment, path)?;
        } else if options.require_file {
            return Err(ConfigurationError::FileNotFound {
                path: path.display().to_string(),
            });
        } else {
            warn!(
                "Configuration file not found: {} (using defaults)",
                path.display()
            );
        }
    }

    figment = figment.merge(
        Env::prefixed(&format!("{}_", options.env_prefix))
            .split("__")
            .ignore(&["PATH", "HOME", "USER"]),
    );

    let config: T = figment
        .extract()
        .map_err(|err| ConfigurationError::ParseError {
            details: format!("Failed to parse configuration: {err}"),
        })?;

    debug!(
        "Configuration loaded from {} sources",
        figment.metadata().count()
    );

    Ok(config)
}

/// Add file provider to figment based on file extension
fn add_file_provider(figment: Figment, path: &Path) -> Result<Figment, ConfigurationError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("toml");

    match extension.to_lowercase().as_str() {
        "toml" => Ok(figment.merge(Toml::file(path))),
        _ => Err(ConfigurationError::ParseError {
            details: format!(
                "Unsupported configuration file format: {extension} (supported: toml)"
            ),
        }),
    }
}

/// Validate configuration file format
pub fn validate_config_file(path: &Path) -> Result<(), ConfigurationError> {
    if !path.exists() {
        return Err(ConfigurationError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    add_file_provider(Figment::new(), path).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use serde::{Deserialize, Serialize};
    use std::env;
    use tempfile::NamedTempFile;

    #[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
    struct TestConfig {
        pub name: String,
        pub port: u16,
        pub nested: NestedConfig,
    }

    #[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
    struct NestedConfig {
        pub enabled: bool,
        pub timeout: u64,
    }

    impl ConfigLoader for TestConfig {
        const ENV_PREFIX: &'static str = "LOADER_TRAIT_TEST";
        const DEFAULT_FILE: &'static str = "loader-trait-test-does-not-exist.toml";
    }

    #[test]
    fn test_missing_default_file_uses_defaults() {
        let config = TestConfig::load(None).unwrap();
        assert_eq!(config, TestConfig::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let toml_content = r#"
            name = "listings"
            port = 8080

            [nested]
            enabled = true
            timeout = 30
        "#;

        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        std::io::Write::write_all(&mut temp_file, toml_content.as_bytes()).unwrap();

        let config = TestConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.name, "listings");
        assert_eq!(config.port, 8080);
        assert!(config.nested.enabled);
        assert_eq!(config.nested.timeout, 30);
    }

    #[test]
    fn test_env_var_overrides() {
        let test_prefix = "LOADER_ENV_TEST";
        env::set_var(format!("{test_prefix}_NAME"), "env_test");
        env::set_var(format!("{test_prefix}_PORT"), "9090");
        env::set_var(format!("{test_prefix}_NESTED__ENABLED"), "true");
        env::set_var(format!("{test_prefix}_NESTED__TIMEOUT"), "60");

        let options = LoadOptions {
            config_path: None,
            env_prefix: test_prefix.to_string(),
            require_file: false,
        };

        let config: TestConfig = load_config_with_options(options).unwrap();
        assert_eq!(config.name, "env_test");
        assert_eq!(config.port, 9090);
        assert!(config.nested.enabled);
        assert_eq!(config.nested.timeout, 60);

        env::remove_var(format!("{test_prefix}_NAME"));
        env::remove_var(format!("{test_prefix}_PORT"));
        env::remove_var(format!("{test_prefix}_NESTED__ENABLED"));
        env::remove_var(format!("{test_prefix}_NESTED__TIMEOUT"));
    }

    #[test]
    fn test_apply_env_overrides_keeps_existing_values() {
        let test_prefix = "LOADER_APPLY_TEST";
        env::set_var(format!("{test_prefix}_PORT"), "7070");

        let mut config = TestConfig {
            name: "kept".to_string(),
            port: 1,
            nested: NestedConfig {
                enabled: true,
                timeout: 5,
            },
        };
        config.apply_env_overrides(test_prefix).unwrap();

        assert_eq!(config.name, "kept");
        assert_eq!(config.port, 7070);
        assert_eq!(config.nested.timeout, 5);

        env::remove_var(format!("{test_prefix}_PORT"));
    }

    #[test]
    fn test_file_not_found_when_required() {
        let non_existent_path = PathBuf::from("/non/existent/config.toml");
        let result = TestConfig::load_from_file(&non_existent_path);

        match result {
            Err(ConfigurationError::FileNotFound { path }) => {
                assert_eq!(path, "/non/existent/config.toml");
            }
            other => panic!("Expected FileNotFound error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_config_file() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        std::io::Write::write_all(&mut temp_file, b"name = 'test'").unwrap();
        assert!(validate_config_file(temp_file.path()).is_ok());

        let yaml_file = NamedTempFile::with_suffix(".yaml").unwrap();
        assert!(validate_config_file(yaml_file.path()).is_err());

        let non_existent = PathBuf::from("/non/existent.toml");
        assert!(validate_config_file(&non_existent).is_err());
    }
}
