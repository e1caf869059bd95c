//! Response Normalizer
//!
//! Turns raw model text into a typed document. Models wrap JSON in markdown
//! fences despite being told not to, so a leading fence (with or without a
//! `json` label, on its own line or not) and a trailing fence are stripped before parsing. No repair is attempted: a
//! response that does not parse is an error carrying the untouched text.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::{Result, SerpError};

pub fn normalize<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let cleaned = strip_code_fences(raw.trim());
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return Err(SerpError::malformed("empty response body", raw));
    }

    serde_json::from_str(cleaned).map_err(|e| {
        debug!(error = %e, len = raw.len(), "Model response failed to parse");
        SerpError::malformed(e.to_string(), raw)
    })
}

fn strip_code_fences(s: &str) -> &str {
    let mut result = s;

    // ```json ... ``` or ``` ... ```, possibly on one line
    if let Some(rest) = result.strip_prefix("```") {
        result = match rest.find('\n') {
            Some(first_newline) => &rest[first_newline + 1..],
            None => strip_fence_label(rest),
        };
    }

    if let Some(stripped) = result.trim_end().strip_suffix("```") {
        result = stripped;
    }

    result
}

fn strip_fence_label(s: &str) -> &str {
    let s = s.trim_start();
    match s.get(..4) {
        Some(label) if label.eq_ignore_ascii_case("json") => &s[4..],
        _ => s,
    }
}
