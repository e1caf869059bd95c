//! Expand Command
//!
//! Grow a saved analysis with fresh clusters that avoid the existing ones.
//! The merged document replaces the input unless `-o` points elsewhere.
//!
//! Usage:
//!   serpscope expand <document.json> --topic T [--language L] [--platform P] [-o file]

use std::path::Path;

use tracing::info;

use crate::analysis::AnalysisDocument;
use crate::cli::report::analysis_summary;
use crate::cli::util::{CommandContext, block_on, emit, read_json};
use crate::types::Result;

pub fn run(
    document: &Path,
    topic: &str,
    language: Option<String>,
    platform: Option<String>,
    output: Option<&Path>,
) -> Result<()> {
    let base: AnalysisDocument = read_json(document)?;
    let context = CommandContext::load()?;
    let language = context.language(language);
    let platform = context.platform(platform);

    info!(
        topic,
        existing = base.clusters.len(),
        "Expanding {}",
        document.display()
    );

    let merged = block_on(
        context
            .orchestrator
            .expand_document(&base, topic, &language, &platform),
    )?;

    info!(
        added = merged.clusters.len().saturating_sub(base.clusters.len()),
        "Merged expansion"
    );

    emit(
        &merged,
        &analysis_summary(&merged),
        Some(output.unwrap_or(document)),
    )
}
