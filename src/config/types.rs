//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/serpscope/) and project (.serpscope/) level configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{defaults, model, retry};
use crate::types::{Result, SerpError};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote model settings
    pub model: ModelConfig,

    /// Retry controller settings
    pub retry: RetryConfig,

    /// Defaults for CLI inputs
    pub defaults: DefaultsConfig,
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `SerpError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.model.model.trim().is_empty() {
            return Err(SerpError::Config("model.model must not be empty".to_string()));
        }

        if self.model.timeout_secs == 0 {
            return Err(SerpError::Config(
                "model.timeout_secs must be greater than 0".to_string(),
            ));
        }

        match url::Url::parse(&self.model.api_base) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(SerpError::Config(format!(
                    "model.api_base must be http or https, got {}",
                    url.scheme()
                )));
            }
            Err(e) => {
                return Err(SerpError::Config(format!(
                    "model.api_base is not a valid URL ({}): {}",
                    self.model.api_base, e
                )));
            }
        }

        if self.retry.max_attempts == 0 {
            return Err(SerpError::Config(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Model Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Provider type: "gemini"
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// REST endpoint base
    pub api_base: String,

    /// Per-request transport timeout in seconds
    pub timeout_secs: u64,

    /// Environment variables checked for an API key, in order
    pub api_key_env: Vec<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: model::DEFAULT_MODEL.to_string(),
            api_base: model::DEFAULT_API_BASE.to_string(),
            timeout_secs: model::DEFAULT_TIMEOUT_SECS,
            api_key_env: model::API_KEY_ENV_VARS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

// =============================================================================
// Retry Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts per remote call, including the first
    pub max_attempts: u32,

    /// Delay before the first retry in milliseconds; doubles per retry
    pub initial_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: retry::DEFAULT_MAX_ATTEMPTS,
            initial_delay_ms: retry::INITIAL_DELAY_MS,
        }
    }
}

// =============================================================================
// Input Defaults
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Target language when `--language` is omitted
    pub language: String,

    /// Target platform when `--platform` is omitted
    pub platform: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            language: defaults::LANGUAGE.to_string(),
            platform: defaults::PLATFORM.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.model.provider, "gemini");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.initial_delay_ms, 2000);
        assert_eq!(config.defaults.language, "English");
        assert_eq!(config.model.api_key_env[0], "SERPSCOPE_API_KEY");
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.model.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(SerpError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_api_base() {
        let mut config = Config::default();
        config.model.api_base = "not a url".to_string();
        assert!(config.validate().is_err());

        config.model.api_base = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str("[retry]\nmax_attempts = 5\n").unwrap();
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.initial_delay_ms, 2000);
        assert_eq!(config.model, ModelConfig::default());
    }
}
