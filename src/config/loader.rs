//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/serpscope/config.toml)
//! 3. Project config (.serpscope/config.toml)
//! 4. Environment variables (SERPSCOPE_* prefix, `__` between nested keys)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{Result, SerpError};

const ENV_PREFIX: &str = "SERPSCOPE_";
const APP_DIR: &str = "serpscope";
const PROJECT_DIR: &str = ".serpscope";
const CONFIG_FILE: &str = "config.toml";

/// Output format for `config show`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    #[default]
    Toml,
    Json,
}

impl std::str::FromStr for ConfigFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format '{}'. Valid values: toml, json", s)),
        }
    }
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let global = Self::global_config_path();
        Self::load_layers(
            global.as_deref(),
            &Self::project_config_path(),
            ENV_PREFIX,
        )
    }

    /// Load from explicit file locations and env prefix
    pub fn load_layers(global: Option<&Path>, project: &Path, env_prefix: &str) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        // e.g. SERPSCOPE_RETRY__MAX_ATTEMPTS -> retry.max_attempts
        figment = figment.merge(Env::prefixed(env_prefix).split("__"));

        let config: Config = figment
            .extract()
            .map_err(|e| SerpError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| SerpError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Global config directory (~/.config/serpscope/ on Linux)
    pub fn global_dir() -> Option<PathBuf> {
        directories::BaseDirs::new().map(|dirs| dirs.config_dir().join(APP_DIR))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(PROJECT_DIR).join(CONFIG_FILE)
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:      {} {}", exists, global.display());
        } else {
            println!("  Global:      (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project:     {} {}", exists, project.display());

        if let Some(credentials) = Self::global_dir().map(|d| d.join("credentials.toml")) {
            let exists = if credentials.exists() { "✓" } else { "✗" };
            println!("  Credentials: {} {}", exists, credentials.display());
        }
    }

    /// Render a configuration in the requested format
    pub fn render(config: &Config, format: ConfigFormat) -> Result<String> {
        match format {
            ConfigFormat::Json => Ok(serde_json::to_string_pretty(config)?),
            ConfigFormat::Toml => {
                toml::to_string_pretty(config).map_err(|e| SerpError::Config(e.to_string()))
            }
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write the default global config. Existing files are kept unless `force`.
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            SerpError::Config("Cannot determine global config directory".to_string())
        })?;
        Self::init_at(&global_dir.join(CONFIG_FILE), force)
    }

    /// Write the default config to `path`
    pub fn init_at(path: &Path, force: bool) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if !path.exists() || force {
            fs::write(path, Self::default_config_file()?)?;
            info!("Created config: {}", path.display());
        } else {
            info!("Config exists: {}", path.display());
        }

        Ok(path.to_path_buf())
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn default_config_file() -> Result<String> {
        let body = toml::to_string_pretty(&Config::default())
            .map_err(|e| SerpError::Config(e.to_string()))?;
        Ok(format!(
            "# SerpScope Configuration\n\
             # Project settings in .serpscope/config.toml override these.\n\n{}",
            body
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn missing(dir: &TempDir) -> PathBuf {
        dir.path().join("missing.toml")
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("json".parse::<ConfigFormat>().unwrap(), ConfigFormat::Json);
        assert_eq!("TOML".parse::<ConfigFormat>().unwrap(), ConfigFormat::Toml);
        assert!("yaml".parse::<ConfigFormat>().is_err());
    }

    #[test]
    fn test_load_defaults_without_files() {
        let dir = TempDir::new().unwrap();
        let config = ConfigLoader::load_layers(None, &missing(&dir), "SERPSCOPE_TEST_NONE_").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_project_overrides_global() {
        let dir = TempDir::new().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("project.toml");
        fs::write(
            &global,
            "[model]\nmodel = \"gemini-global\"\ntimeout_secs = 30\n",
        )
        .unwrap();
        fs::write(&project, "[model]\nmodel = \"gemini-project\"\n").unwrap();

        let config =
            ConfigLoader::load_layers(Some(&global), &project, "SERPSCOPE_TEST_LAYERS_").unwrap();
        assert_eq!(config.model.model, "gemini-project");
        assert_eq!(config.model.timeout_secs, 30);
    }

    #[test]
    fn test_env_override() {
        let dir = TempDir::new().unwrap();
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("SERPSCOPE_TEST_ENV_RETRY__MAX_ATTEMPTS", "7");
        }
        let config =
            ConfigLoader::load_layers(None, &missing(&dir), "SERPSCOPE_TEST_ENV_").unwrap();
        unsafe {
            std::env::remove_var("SERPSCOPE_TEST_ENV_RETRY__MAX_ATTEMPTS");
        }
        assert_eq!(config.retry.max_attempts, 7);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("project.toml");
        fs::write(&project, "[retry]\nmax_attempts = 0\n").unwrap();

        let err = ConfigLoader::load_layers(None, &project, "SERPSCOPE_TEST_INVALID_").unwrap_err();
        assert!(matches!(err, SerpError::Config(_)));
    }

    #[test]
    fn test_init_writes_loadable_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        ConfigLoader::init_at(&path, false).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# SerpScope Configuration"));

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_init_respects_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "# custom\n").unwrap();

        ConfigLoader::init_at(&path, false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "# custom\n");

        ConfigLoader::init_at(&path, true).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("[retry]"));
    }

    #[test]
    fn test_render_formats() {
        let config = Config::default();
        let json = ConfigLoader::render(&config, ConfigFormat::Json).unwrap();
        assert!(json.contains("\"max_attempts\": 3"));

        let toml = ConfigLoader::render(&config, ConfigFormat::Toml).unwrap();
        assert!(toml.contains("[defaults]"));
    }
}
