//! Terminal summaries of analysis results.
//!
//! Every model-reported number is clamped before it is printed.

use console::style;

use crate::analysis::{
    AnalysisDocument, CompetitorAnalysisResult, KdBand, KeywordCoverage, clamp_score,
    ranked_keywords, unique_keywords,
};
use crate::constants::insights::{PERCENT_MAX, SCORE_MAX};
use crate::constants::report::TOP_KEYWORDS;

pub fn analysis_summary(document: &AnalysisDocument) -> String {
    let mut lines = vec![style("Keyword Intelligence").bold().underlined().to_string()];

    if !document.executive_summary.is_empty() {
        lines.push(document.executive_summary.clone());
    }

    lines.push(String::new());
    lines.push(heading(&format!("Clusters ({})", document.clusters.len())));
    for cluster in &document.clusters {
        lines.push(format!(
            "  • {}  relevance {:.0}/5  vol {}  ({} keywords)",
            style(&cluster.name).cyan(),
            clamp_score(cluster.business_relevance, SCORE_MAX),
            or_dash(&cluster.total_volume_est),
            cluster.keywords.len()
        ));
    }

    // Ranked over unique terms; a repeated term keeps its first occurrence
    let unique = unique_keywords(&document.clusters);
    let ranked: Vec<_> = ranked_keywords(&document.clusters)
        .into_iter()
        .filter(|entry| unique.iter().any(|k| std::ptr::eq(*k, entry.keyword)))
        .collect();
    if !ranked.is_empty() {
        lines.push(String::new());
        lines.push(heading(&format!(
            "Hardest keywords ({} of {} unique)",
            ranked.len().min(TOP_KEYWORDS),
            unique.len()
        )));
        for entry in ranked.iter().take(TOP_KEYWORDS) {
            lines.push(format!(
                "  {:>3.0}  {:<6}  {}  [{}]",
                clamp_score(entry.keyword.kd, PERCENT_MAX),
                band_label(entry.band()),
                entry.keyword.term,
                entry.cluster
            ));
        }
    }

    if !document.recommendations.is_empty() {
        lines.push(String::new());
        lines.push(heading(&format!(
            "Recommendations ({})",
            document.recommendations.len()
        )));
        for rec in &document.recommendations {
            lines.push(format!(
                "  • [{}] {} ({})",
                or_dash(rec.funnel_stage.label()),
                rec.title,
                or_dash(rec.content_type.label())
            ));
        }
    }

    let discovery = &document.deep_discovery;
    lines.push(String::new());
    lines.push(format!(
        "Discovery: {} pain points, {} questions, {} discussions, {} long-tail rows",
        discovery.pain_points.len(),
        discovery.people_also_ask.len(),
        discovery.discussions.len(),
        discovery.matrix.len()
    ));
    lines.push(format!("Sources: {}", document.sources.len()));

    lines.join("\n")
}

pub fn competitor_summary(result: &CompetitorAnalysisResult) -> String {
    let kd = clamp_score(result.kd_score, PERCENT_MAX);
    let mut lines = vec![
        style(format!("Competitor Analysis: {}", result.keyword))
            .bold()
            .underlined()
            .to_string(),
        format!("KD {:.0} ({})", kd, band_label(KdBand::from_kd(kd))),
    ];

    if !result.tldr.is_empty() {
        lines.push(result.tldr.clone());
    }

    lines.push(String::new());
    lines.push(heading(&format!("Ranking pages ({})", result.competitors.len())));
    for (i, page) in result.competitors.iter().enumerate() {
        lines.push(format!(
            "  {}. {}  DA {:.0}  on-page {:.1}/5",
            i + 1,
            page.title,
            clamp_score(page.domain_authority, PERCENT_MAX),
            clamp_score(page.on_page_score, SCORE_MAX)
        ));
        lines.push(format!("     {}", style(&page.url).dim()));
    }

    let gaps = &result.gaps;
    lines.push(String::new());
    lines.push(heading("Content gaps"));
    lines.push(format!("  Information: {}", join_or_dash(&gaps.information)));
    lines.push(format!("  Structural:  {}", join_or_dash(&gaps.structural)));
    lines.push(format!("  Monetization: {}", or_dash(&gaps.monetization)));

    lines.join("\n")
}

pub fn coverage_summary(coverage: &KeywordCoverage) -> String {
    let total = coverage.matched.len() + coverage.missing.len();
    [
        style(format!("Keyword coverage: {}%", coverage.score))
            .bold()
            .to_string(),
        format!("Matched ({}/{}): {}", coverage.matched.len(), total, join_or_dash(&coverage.matched)),
        format!("Missing ({}): {}", coverage.missing.len(), join_or_dash(&coverage.missing)),
    ]
    .join("\n")
}

fn heading(text: &str) -> String {
    style(text).bold().to_string()
}

fn band_label(band: KdBand) -> String {
    match band {
        KdBand::Easy => style(band.as_str()).green().to_string(),
        KdBand::Medium => style(band.as_str()).yellow().to_string(),
        KdBand::Hard => style(band.as_str()).red().to_string(),
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

fn join_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}
