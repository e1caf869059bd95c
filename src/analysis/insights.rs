//! Read-side helpers over analysis documents.
//!
//! Model-reported numbers are never trusted as-is; everything that renders
//! or ranks a score goes through these functions.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::constants::insights::{KD_HARD, KD_MEDIUM, PERCENT_MAX};

use super::model::{Cluster, Keyword};

/// Clamp a model-reported score into `[0, max]`. NaN becomes 0.
pub fn clamp_score(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max)
}

/// Ranking difficulty bucket derived from KD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdBand {
    Easy,
    Medium,
    Hard,
}

impl KdBand {
    pub fn from_kd(kd: f64) -> Self {
        let kd = clamp_score(kd, PERCENT_MAX);
        if kd >= KD_HARD {
            Self::Hard
        } else if kd >= KD_MEDIUM {
            Self::Medium
        } else {
            Self::Easy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl std::fmt::Display for KdBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All keywords across clusters, first occurrence of each term wins
/// (case-insensitive).
pub fn unique_keywords(clusters: &[Cluster]) -> Vec<&Keyword> {
    let mut seen = HashSet::new();
    clusters
        .iter()
        .flat_map(|c| c.keywords.iter())
        .filter(|k| seen.insert(k.term.to_lowercase()))
        .collect()
}

/// How well a piece of content covers the document's keywords.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordCoverage {
    /// Terms found in the content, in keyword order
    pub matched: Vec<String>,
    /// Terms not found
    pub missing: Vec<String>,
    /// Rounded percentage of unique terms found, 0 when there are none
    pub score: u32,
}

pub fn keyword_coverage(clusters: &[Cluster], content: &str) -> KeywordCoverage {
    let text = content.to_lowercase();
    let (matched, missing): (Vec<String>, Vec<String>) = unique_keywords(clusters)
        .into_iter()
        .map(|k| k.term.clone())
        .partition(|term| text.contains(&term.to_lowercase()));

    let total = matched.len() + missing.len();
    let score = if total == 0 {
        0
    } else {
        (100.0 * matched.len() as f64 / total as f64).round() as u32
    };

    KeywordCoverage {
        matched,
        missing,
        score,
    }
}

/// A keyword with the cluster it belongs to
#[derive(Debug, Clone)]
pub struct RankedKeyword<'a> {
    pub keyword: &'a Keyword,
    pub cluster: &'a str,
    pub relevance: f64,
}

impl RankedKeyword<'_> {
    pub fn band(&self) -> KdBand {
        KdBand::from_kd(self.keyword.kd)
    }
}

/// Flattened keywords, hardest first. Ties keep document order.
pub fn ranked_keywords(clusters: &[Cluster]) -> Vec<RankedKeyword<'_>> {
    let mut ranked: Vec<RankedKeyword<'_>> = clusters
        .iter()
        .flat_map(|c| {
            c.keywords.iter().map(move |k| RankedKeyword {
                keyword: k,
                cluster: c.name.as_str(),
                relevance: c.business_relevance,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        let a_kd = clamp_score(a.keyword.kd, PERCENT_MAX);
        let b_kd = clamp_score(b.keyword.kd, PERCENT_MAX);
        b_kd.partial_cmp(&a_kd).unwrap_or(Ordering::Equal)
    });
    ranked
}
