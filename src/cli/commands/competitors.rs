//! Competitors Command
//!
//! SERP competitor study for one keyword.
//!
//! Usage:
//!   serpscope competitors <keyword> [-o file]

use std::path::Path;

use crate::cli::report::competitor_summary;
use crate::cli::util::{CommandContext, block_on, emit};
use crate::types::Result;

pub fn run(keyword: &str, output: Option<&Path>) -> Result<()> {
    let context = CommandContext::load()?;
    let result = block_on(context.orchestrator.run_competitor_analysis(keyword))?;
    emit(&result, &competitor_summary(&result), output)
}
