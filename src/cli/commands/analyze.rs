//! Analyze Command
//!
//! Full keyword intelligence for a topic.
//!
//! Usage:
//!   serpscope analyze <topic> [--language L] [--platform P] [-o file]

use std::path::Path;

use tracing::info;

use crate::cli::report::analysis_summary;
use crate::cli::util::{CommandContext, block_on, emit};
use crate::types::Result;

pub fn run(
    topic: &str,
    language: Option<String>,
    platform: Option<String>,
    output: Option<&Path>,
) -> Result<()> {
    let context = CommandContext::load()?;
    let language = context.language(language);
    let platform = context.platform(platform);

    info!(topic, language = %language, platform = %platform, "Analyzing topic");

    let document = block_on(
        context
            .orchestrator
            .run_full_analysis(topic, &language, &platform),
    )?;

    emit(&document, &analysis_summary(&document), output)
}
