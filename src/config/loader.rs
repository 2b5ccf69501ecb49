//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::env::{apply_overrides, EnvError, Profile};
use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env(EnvError),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env(e) => write!(f, "Environment error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration: TOML file (if any), then process environment, then validation.
pub fn load_config(path: Option<&Path>) -> Result<(AppConfig, Profile), ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => AppConfig::default(),
    };
    finish(config, |key| std::env::var(key).ok())
}

/// Apply environment overrides from `lookup` and validate.
pub fn finish<F>(mut config: AppConfig, lookup: F) -> Result<(AppConfig, Profile), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let profile = apply_overrides(&mut config, lookup).map_err(ConfigError::Env)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok((config, profile))
}
