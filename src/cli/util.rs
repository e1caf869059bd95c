//! CLI Common Utilities
//!
//! Shared initialization and document I/O for CLI commands.

use std::fs;
use std::future::Future;
use std::io;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use crate::cli::ui::Output;
use crate::config::{Config, ConfigLoader};
use crate::orchestrator::AnalysisOrchestrator;
use crate::types::{Result, SerpError};

/// Command execution context
///
/// Loaded configuration plus an orchestrator built from it. Commands that
/// never reach the model (key, config, coverage) load `Config` directly.
pub struct CommandContext {
    pub config: Config,
    pub orchestrator: AnalysisOrchestrator,
}

impl CommandContext {
    pub fn load() -> Result<Self> {
        let config = ConfigLoader::load()?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let orchestrator = AnalysisOrchestrator::from_config(&config)?;
        Ok(Self {
            config,
            orchestrator,
        })
    }

    /// CLI value, else the configured default
    pub fn language(&self, value: Option<String>) -> String {
        value.unwrap_or_else(|| self.config.defaults.language.clone())
    }

    pub fn platform(&self, value: Option<String>) -> String {
        value.unwrap_or_else(|| self.config.defaults.platform.clone())
    }
}

/// Drive an orchestrator future to completion on a fresh runtime.
///
/// Ctrl-C drops the future, which cancels the in-flight request or backoff
/// sleep, and surfaces as an interrupted IO error.
pub fn block_on<F, T>(future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let rt = Runtime::new()?;
    rt.block_on(async {
        tokio::select! {
            result = future => result,
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted, cancelling request");
                Err(SerpError::Io(io::Error::new(
                    io::ErrorKind::Interrupted,
                    "Interrupted",
                )))
            }
        }
    })
}

/// Read a JSON document saved by an earlier command
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    let value = serde_json::from_str(&content)?;
    debug!(path = %path.display(), "Loaded document");
    Ok(value)
}

/// Write pretty JSON, creating parent directories as needed
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    fs::write(path, json)?;
    debug!(path = %path.display(), "Wrote document");
    Ok(())
}

/// Deliver a command result.
///
/// With an output file the summary goes to stdout and the JSON to the file.
/// Without one, the JSON goes to stdout and the summary to stderr so the
/// document can be piped.
pub fn emit<T: Serialize>(value: &T, summary: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            write_json(path, value)?;
            println!("{}", summary);
            Output::new().success(&format!("Saved to {}", path.display()));
        }
        None => {
            eprintln!("{}", summary);
            println!("{}", serde_json::to_string_pretty(value)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisDocument, Cluster};
    use tempfile::TempDir;

    #[test]
    fn test_json_round_trip_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("doc.json");

        let document = AnalysisDocument {
            executive_summary: "summary".to_string(),
            clusters: vec![Cluster {
                name: "Entretien".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };

        write_json(&path, &document).unwrap();
        let loaded: AnalysisDocument = read_json(&path).unwrap();
        assert_eq!(loaded, document);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"executiveSummary\""));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let result: Result<AnalysisDocument> = read_json(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(SerpError::Io(_))));
    }

    #[test]
    fn test_read_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let result: Result<AnalysisDocument> = read_json(&path);
        assert!(matches!(result, Err(SerpError::Json(_))));
    }

    #[test]
    fn test_block_on_returns_result() {
        let value = block_on(async { Ok::<_, SerpError>(7) }).unwrap();
        assert_eq!(value, 7);

        let err = block_on(async { Err::<(), _>(SerpError::EmptyResponse) }).unwrap_err();
        assert!(matches!(err, SerpError::EmptyResponse));
    }

    #[test]
    fn test_context_defaults() {
        let context = CommandContext::from_config(Config::default()).unwrap();
        assert_eq!(context.language(None), Config::default().defaults.language);
        assert_eq!(context.platform(Some("Bing".to_string())), "Bing");
    }
}
