//! Credential Resolution
//!
//! The API key comes from the first non-blank environment variable in the
//! configured list, then from a user-supplied key stored in
//! `credentials.toml` next to the global config. Keys stay wrapped in
//! `SecretString` and are never logged.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ConfigLoader, ModelConfig};
use crate::types::{Result, SerpError};

const CREDENTIALS_FILE: &str = "credentials.toml";

/// Where a resolved key came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    Env(String),
    Store(PathBuf),
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Env(var) => write!(f, "environment variable {}", var),
            KeySource::Store(path) => write!(f, "{}", path.display()),
        }
    }
}

// =============================================================================
// Key Store
// =============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
}

/// User-supplied key persisted as TOML
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyStore {
    path: PathBuf,
}

impl KeyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the global config directory
    pub fn global() -> Option<Self> {
        ConfigLoader::global_dir().map(|dir| Self::new(dir.join(CREDENTIALS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored key, if any. A missing file is not an error.
    pub fn load(&self) -> Result<Option<SecretString>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let stored: StoredCredentials = toml::from_str(&content).map_err(|e| {
            SerpError::Config(format!(
                "Invalid credentials file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(stored
            .api_key
            .filter(|key| !key.trim().is_empty())
            .map(|key| SecretString::from(key.trim().to_string())))
    }

    pub fn save(&self, key: &SecretString) -> Result<()> {
        let trimmed = key.expose_secret().trim();
        if trimmed.is_empty() {
            return Err(SerpError::Config("API key must not be empty".to_string()));
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let stored = StoredCredentials {
            api_key: Some(trimmed.to_string()),
        };
        let content =
            toml::to_string(&stored).map_err(|e| SerpError::Config(e.to_string()))?;
        write_private(&self.path, content.as_bytes())?;

        debug!(path = %self.path.display(), "Stored API key");
        Ok(())
    }

    /// Remove the stored key. Returns whether a file was removed.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)?;
        Ok(true)
    }
}

/// Write `content` readable by the owner only. The mode is set at creation
/// and narrowed on an existing file before any key bytes land in it.
#[cfg(unix)]
fn write_private(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(content)?;
    Ok(())
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &[u8]) -> Result<()> {
    fs::write(path, content)?;
    Ok(())
}

// =============================================================================
// Resolver
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct CredentialResolver {
    env_vars: Vec<String>,
    store: Option<KeyStore>,
}

impl CredentialResolver {
    pub fn new(env_vars: Vec<String>, store: Option<KeyStore>) -> Self {
        Self { env_vars, store }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(config.api_key_env.clone(), KeyStore::global())
    }

    pub fn store(&self) -> Option<&KeyStore> {
        self.store.as_ref()
    }

    /// Resolve the key, or `MissingCredentials` when no source has one.
    pub fn resolve(&self) -> Result<SecretString> {
        self.resolve_with_source()?
            .map(|(key, _)| key)
            .ok_or(SerpError::MissingCredentials)
    }

    /// Resolve the key along with where it was found.
    pub fn resolve_with_source(&self) -> Result<Option<(SecretString, KeySource)>> {
        for var in &self.env_vars {
            if let Ok(value) = std::env::var(var)
                && !value.trim().is_empty()
            {
                debug!(source = %var, "Using API key from environment");
                return Ok(Some((
                    SecretString::from(value.trim().to_string()),
                    KeySource::Env(var.clone()),
                )));
            }
        }

        if let Some(store) = &self.store
            && let Some(key) = store.load()?
        {
            debug!(source = %store.path().display(), "Using stored API key");
            return Ok(Some((key, KeySource::Store(store.path().to_path_buf()))));
        }

        Ok(None)
    }
}
