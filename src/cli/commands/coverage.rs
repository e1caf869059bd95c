//! Coverage Command
//!
//! Score a draft against the keywords of a saved analysis. Runs offline.
//!
//! Usage:
//!   serpscope coverage <document.json> <content-file> [-f text|json]

use std::fs;
use std::path::Path;

use serde_json::json;

use crate::analysis::{AnalysisDocument, keyword_coverage};
use crate::cli::report::coverage_summary;
use crate::cli::util::read_json;
use crate::types::Result;

/// Output format for the coverage report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoverageFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for CoverageFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format '{}'. Valid values: text, json", s)),
        }
    }
}

pub fn run(document: &Path, content: &Path, format: CoverageFormat) -> Result<()> {
    let document: AnalysisDocument = read_json(document)?;
    let text = fs::read_to_string(content)?;
    let coverage = keyword_coverage(&document.clusters, &text);

    match format {
        CoverageFormat::Json => {
            let value = json!({
                "score": coverage.score,
                "matched": coverage.matched,
                "missing": coverage.missing,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        CoverageFormat::Text => println!("{}", coverage_summary(&coverage)),
    }
    Ok(())
}
