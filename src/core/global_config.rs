//! Global configuration management
//!
//! Reads optional settings from `config.toml`. Every field is optional;
//! command-line flags and environment variables take precedence, built-in
//! defaults fill the rest.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::{defaults, urls};
use crate::core::builder::FailurePolicy;
use crate::error::ConfigError;
use crate::infra::dirs::CiDirs;

/// Global configuration for channelci
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Registry settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,
}

/// Registry configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Custom API base URL
    pub api_url: Option<String>,

    /// Default target channel
    pub channel: Option<String>,
}

/// Build configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    /// conda executable
    pub conda: Option<String>,

    /// Platform subdir override
    pub subdir: Option<String>,

    /// Build failure handling
    pub on_failure: Option<FailurePolicy>,
}

impl GlobalConfig {
    /// Load from the config directory; a missing file yields defaults
    pub fn load(dirs: &CiDirs) -> Result<Self, ConfigError> {
        Self::load_from_path(&dirs.global_config_path())
    }

    /// Load from a specific path; a missing file yields defaults
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Effective API base URL
    #[must_use]
    pub fn api_url(&self) -> &str {
        self.registry.api_url.as_deref().unwrap_or(urls::ANACONDA_API)
    }

    /// Effective channel
    #[must_use]
    pub fn channel(&self) -> &str {
        self.registry
            .channel
            .as_deref()
            .unwrap_or(defaults::DEFAULT_CHANNEL)
    }

    /// Effective conda executable
    #[must_use]
    pub fn conda(&self) -> &str {
        self.build.conda.as_deref().unwrap_or(defaults::DEFAULT_CONDA)
    }

    /// Effective platform subdir
    #[must_use]
    pub fn subdir(&self) -> String {
        self.build.subdir.clone().unwrap_or_else(defaults::host_subdir)
    }

    /// Effective failure policy
    #[must_use]
    pub fn failure_policy(&self) -> FailurePolicy {
        self.build.on_failure.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = GlobalConfig::default();
        assert_eq!(config.api_url(), urls::ANACONDA_API);
        assert_eq!(config.channel(), "main");
        assert_eq!(config.conda(), "conda");
        assert_eq!(config.failure_policy(), FailurePolicy::Abort);
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = GlobalConfig::load_from_path(&temp_dir.path().join("config.toml")).unwrap();
        assert!(config.registry.api_url.is_none());
    }

    #[test]
    fn test_load_valid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
[registry]
api_url = "http://localhost:8080"
channel = "dev"

[build]
subdir = "linux-aarch64"
on_failure = "skip-dependents"
"#,
        )
        .unwrap();

        let config = GlobalConfig::load(&CiDirs::with_config_dir(temp_dir.path().to_path_buf()))
            .unwrap();
        assert_eq!(config.api_url(), "http://localhost:8080");
        assert_eq!(config.channel(), "dev");
        assert_eq!(config.subdir(), "linux-aarch64");
        assert_eq!(config.failure_policy(), FailurePolicy::SkipDependents);
    }

    #[test]
    fn test_load_invalid_toml_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "invalid toml [[[").unwrap();

        let err = GlobalConfig::load_from_path(&config_path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
