//! Task Prompts
//!
//! The three analysis tasks and the system instruction they share. Each
//! prompt embeds the exact JSON shape expected back, since search grounding
//! rules out response schemas on the model side.

use serde_json::{Value, json};

use super::PromptBuilder;
use crate::ai::provider::SamplingParams;
use crate::constants::prompt::{
    COMPETITOR_PAGES, LONG_TAIL_KEYWORDS, NEW_CLUSTERS, NEW_MATRIX_ROWS, NEW_QUESTIONS,
    NEW_RECOMMENDATIONS, PAIN_POINTS, PEOPLE_ALSO_ASK, TARGET_REGION,
};
use crate::constants::sampling;

/// Shared system instruction for every task
pub const SYSTEM_INSTRUCTION: &str = r#"You are an Elite SEO Systems Architect specializing in North African (MENA) markets.
Your mission is to transform real-time Google Search data into structured, strategic SEO intelligence.

Operational Rules:
1. Data Grounding: Use Google Search to find real ranking data.
2. Linguistic Nuance: Detect Darija, French, MSA, and Transliterated Arabic (Arabizi).
3. Keyword Difficulty (KD) Formula:
   Estimate the following metrics for top ranking pages to calculate KD:
   KD = 0.4 * (Median Ref Domains normalized 0-100) + 0.3 * (Avg DA normalized 0-100) + 0.3 * (On-Page Score 0-100).
   Return the final KD (0-100).
4. Content Evaluation: Score recommendations 0-5 on Depth, E-E-A-T, and Speed.
5. Deep Discovery Validation:
   - Validate keywords against the current SERP.
   - Remove brand-only navigational queries.
   - Remove outdated models and products.
   - Remove geographic mismatches (must be relevant to MENA).
6. Format: Return strictly valid JSON.

AI Overview Optimization Rule:
- All content recommendations must be structured to maximize AI Overview (SGE) citation probability.
- Include a "Direct Answer" block (40-60 words, encyclopedic, no fluff).
- Use clear bullet points for structure.

Self-Validation:
- Remove outdated trends.
- Eliminate low-intent keywords."#;

const OUTPUT_RULE: &str = "You must return ONLY a raw JSON object. Do not include markdown formatting or explanations.";

const KD_FORMULA: &str = "KD = 0.4 * (Median Ref Domains normalized to 0-100) + 0.3 * (Avg Domain Authority) + 0.3 * (Avg On-Page Optimization normalized to 0-100). Normalize the FINAL KD to 0-100.";

/// Kind of remote call, which decides the sampling profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisTask {
    Full,
    Expansion,
    Competitor,
}

impl AnalysisTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Expansion => "expansion",
            Self::Competitor => "competitor",
        }
    }

    pub fn sampling(&self) -> SamplingParams {
        match self {
            Self::Full => SamplingParams {
                temperature: sampling::full::TEMPERATURE,
                top_p: sampling::full::TOP_P,
                top_k: Some(sampling::full::TOP_K),
                max_output_tokens: sampling::full::MAX_OUTPUT_TOKENS,
            },
            Self::Expansion => SamplingParams {
                temperature: sampling::expansion::TEMPERATURE,
                top_p: sampling::expansion::TOP_P,
                top_k: None,
                max_output_tokens: sampling::expansion::MAX_OUTPUT_TOKENS,
            },
            Self::Competitor => SamplingParams {
                temperature: sampling::competitor::TEMPERATURE,
                top_p: sampling::competitor::TOP_P,
                top_k: Some(sampling::competitor::TOP_K),
                max_output_tokens: sampling::competitor::MAX_OUTPUT_TOKENS,
            },
        }
    }
}

// =============================================================================
// Full Analysis
// =============================================================================

pub fn build_full_analysis_prompt(topic: &str, language: &str, platform: &str) -> String {
    PromptBuilder::new()
        .role("SEO systems architect", "keyword research for MENA markets")
        .text(&format!(
            "Perform a comprehensive SEO analysis for the topic: \"{}\".",
            topic
        ))
        .context_item("Target Region", TARGET_REGION)
        .context_item("Target Language", language)
        .context_item(
            "Target Platform",
            &format!("{} (adjust ranking factors and intent accordingly)", platform),
        )
        .section("PHASE 1: DEEP DISCOVERY", "")
        .objectives([
            "Use Google Search grounding to find \"People Also Ask\" questions and \"Related Searches\".".to_string(),
            format!("Identify {} specific \"People Also Ask\" questions that are trending or common.", PEOPLE_ALSO_ASK),
            format!("Identify {} critical \"Content Gaps\" or \"Pain Points\" where current results are lacking or poor quality.", PAIN_POINTS),
            format!("Expand into {} high-value long-tail keywords relevant to {} search behavior in {}.", LONG_TAIL_KEYWORDS, platform, language),
            "Classify each keyword's funnel stage (Awareness, Consideration, Conversion, Retention).".to_string(),
        ])
        .section("PHASE 2: CLUSTERING & BUSINESS INTELLIGENCE", "")
        .objectives([
            "Semantic Clustering: group keywords into \"Content Hubs\".",
            "Remove semantic duplicates within hubs.",
            "For each hub determine the Primary Intent (Informational / Navigational / Commercial / Transactional), a 15-20 word Description, and a Business Relevance Score from 0 (no monetization potential) to 5 (direct revenue driver).",
            "Calculate KD for top keywords (formula: 0.4*Ref + 0.3*DA + 0.3*OnPage).",
        ])
        .section(
            "PHASE 3: STRATEGY (AI OVERVIEW OPTIMIZATION)",
            "Provide strategic content recommendations based on high relevance hubs.\n\
             CRITICAL: Structure each recommendation to maximize AI Overview (SGE) citation probability.\n\
             - \"aiAnswer\": a precise 40-60 word Direct Answer block in an authoritative, encyclopedic tone.\n\
             - \"outline\": 3-5 structural bullet points that cover the core entity facets.\n\
             - \"funnelStage\": TOFU (Top of Funnel), MOFU (Middle of Funnel) or BOFU (Bottom of Funnel).",
        )
        .section("CRITICAL OUTPUT INSTRUCTION", OUTPUT_RULE)
        .text("The JSON structure must match this EXACT format:")
        .code("json", &pretty(&full_analysis_schema()))
        .build()
}

fn full_analysis_schema() -> Value {
    json!({
        "executiveSummary": "string",
        "deepDiscovery": {
            "painPoints": ["string"],
            "peopleAlsoAsk": ["string"],
            "discussions": [discussion_schema()],
            "matrix": [matrix_row_schema()]
        },
        "clusters": [cluster_schema()],
        "recommendations": [recommendation_schema()]
    })
}

// =============================================================================
// Expansion
// =============================================================================

pub fn build_expansion_prompt(
    topic: &str,
    existing_clusters: &[String],
    language: &str,
    platform: &str,
) -> String {
    let existing = if existing_clusters.is_empty() {
        "(none)".to_string()
    } else {
        existing_clusters.join(", ")
    };

    PromptBuilder::new()
        .role("SEO systems architect", "finding untapped content angles")
        .text(&format!(
            "You are expanding an existing SEO analysis for the topic: \"{}\".",
            topic
        ))
        .context_item("Target Region", TARGET_REGION)
        .context_item("Target Language", language)
        .context_item("Platform", platform)
        .context_item("Current Existing Clusters (DO NOT DUPLICATE)", &existing)
        .objectives([
            format!("Identify {} NEW, DISTINCT Content Hubs (Clusters) that explore different angles, sub-niches, or emerging trends related to the topic.", NEW_CLUSTERS),
            format!("Provide {} NEW Content Recommendations for these hubs.", NEW_RECOMMENDATIONS),
            format!("Identify {} NEW \"People Also Ask\" questions.", NEW_QUESTIONS),
            format!("Identify {} NEW long-tail keywords for the Discovery Matrix.", NEW_MATRIX_ROWS),
        ])
        .focus(
            "angles not yet covered by the existing clusters",
            [
                "Do NOT repeat or rename any existing cluster",
                "Look for \"Blue Ocean\" opportunities or specific long-tail variations",
            ],
        )
        .section("CRITICAL OUTPUT INSTRUCTION", OUTPUT_RULE)
        .text("Output JSON Format (Partial Object):")
        .code("json", &pretty(&expansion_schema()))
        .build()
}

fn expansion_schema() -> Value {
    json!({
        "deepDiscovery": {
            "peopleAlsoAsk": ["string"],
            "matrix": [matrix_row_schema()]
        },
        "clusters": [cluster_schema()],
        "recommendations": [recommendation_schema()]
    })
}

// =============================================================================
// Competitor Analysis
// =============================================================================

pub fn build_competitor_prompt(keyword: &str) -> String {
    PromptBuilder::new()
        .role("SEO competitive analyst", "SERP teardown and keyword difficulty")
        .text(&format!(
            "Analyze the top {} ranking pages for: \"{}\".",
            COMPETITOR_PAGES, keyword
        ))
        .context_item("Target Region", TARGET_REGION)
        .section(
            "For each page evaluate",
            "- Content Depth (0-5)\n\
             - E-E-A-T (0-5)\n\
             - Technical Speed (0-5)\n\
             - Estimated Referring Domains (estimate from domain authority and popularity)\n\
             - Domain Authority (0-100 estimate)\n\
             - On-Page Optimization Score (0-5)",
        )
        .section("Then calculate", KD_FORMULA)
        .section(
            "Identify",
            "- 3 Information Gaps\n- 2 Structural Weaknesses\n- 1 Monetization Gap",
        )
        .section("CRITICAL OUTPUT INSTRUCTION", OUTPUT_RULE)
        .text("The JSON structure must match this EXACT format:")
        .code("json", &pretty(&competitor_schema(keyword)))
        .build()
}

fn competitor_schema(keyword: &str) -> Value {
    json!({
        "keyword": keyword,
        "kdScore": "number",
        "competitors": [{
            "url": "string",
            "title": "string",
            "contentDepth": "number",
            "eeat": "number",
            "techSpeed": "number",
            "estRefDomains": "number",
            "domainAuthority": "number",
            "onPageScore": "number"
        }],
        "gaps": {
            "information": ["string"],
            "structural": ["string"],
            "monetization": "string"
        },
        "strategyNarrative": "string",
        "summary": "string",
        "tldr": "string"
    })
}

// =============================================================================
// Shared Schema Fragments
// =============================================================================

fn discussion_schema() -> Value {
    json!({
        "platform": "Reddit|Quora|Other",
        "topic": "string",
        "sentiment": "Positive|Negative|Neutral",
        "snippet": "string"
    })
}

fn matrix_row_schema() -> Value {
    json!({
        "term": "string",
        "intent": "string",
        "searchTrend": "string",
        "painPoint": "string",
        "funnelStage": "Awareness|Consideration|Conversion|Retention"
    })
}

fn cluster_schema() -> Value {
    json!({
        "name": "string",
        "description": "string",
        "primaryIntent": "string",
        "businessRelevance": "number",
        "totalVolumeEst": "string",
        "keywords": [{
            "term": "string",
            "volume": "string",
            "kd": "number",
            "language": "string",
            "intent": "string",
            "currentRankLeader": "string"
        }]
    })
}

fn recommendation_schema() -> Value {
    json!({
        "title": "string",
        "type": "Blog|Landing Page|Guide|Technical",
        "funnelStage": "TOFU|MOFU|BOFU",
        "aiAnswer": "string",
        "outline": ["string"],
        "score": { "depth": "number", "eeat": "number", "techSpeed": "number" }
    })
}

fn pretty(schema: &Value) -> String {
    serde_json::to_string_pretty(schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_prompt_content() {
        let prompt = build_full_analysis_prompt("vélo électrique", "French", "Google");

        assert!(prompt.contains("\"vélo électrique\""));
        assert!(prompt.contains("**Target Language**: French"));
        assert!(prompt.contains("North Africa (Morocco/MENA)"));
        assert!(prompt.contains("Identify 5 specific \"People Also Ask\""));
        assert!(prompt.contains("Expand into 15 high-value long-tail keywords relevant to Google search behavior in French"));
        assert!(prompt.contains("40-60 word Direct Answer"));
        assert!(prompt.contains("TOFU"));
        assert!(prompt.contains("return ONLY a raw JSON object"));
        assert!(prompt.contains("\"executiveSummary\": \"string\""));
        assert!(prompt.contains("\"currentRankLeader\""));
    }

    #[test]
    fn test_full_prompt_schema_is_valid_json() {
        let prompt = build_full_analysis_prompt("x", "English", "Google");
        let start = prompt.find("```json\n").unwrap() + "```json\n".len();
        let end = prompt[start..].find("\n```").unwrap() + start;
        let schema: Value = serde_json::from_str(&prompt[start..end]).unwrap();
        assert!(schema["deepDiscovery"]["matrix"].is_array());
    }

    #[test]
    fn test_expansion_lists_existing_clusters() {
        let existing = vec!["Entretien".to_string(), "Batteries".to_string()];
        let prompt = build_expansion_prompt("vélo électrique", &existing, "French", "YouTube");

        assert!(prompt.contains("DO NOT DUPLICATE"));
        assert!(prompt.contains("Entretien, Batteries"));
        assert!(prompt.contains("**Platform**: YouTube"));
        assert!(prompt.contains("Identify 3 NEW, DISTINCT Content Hubs"));
        assert!(prompt.contains("Identify 5 NEW \"People Also Ask\""));
        assert!(!prompt.contains("executiveSummary"));
        assert!(!prompt.contains("painPoints"));
    }

    #[test]
    fn test_expansion_without_existing_clusters() {
        let prompt = build_expansion_prompt("x", &[], "English", "Google");
        assert!(prompt.contains("(none)"));
    }

    #[test]
    fn test_competitor_prompt() {
        let prompt = build_competitor_prompt("vélo électrique casablanca");

        assert!(prompt.contains("top 5 ranking pages"));
        assert!(prompt.contains("\"keyword\": \"vélo électrique casablanca\""));
        assert!(prompt.contains("0.4 * (Median Ref Domains"));
        assert!(prompt.contains("1 Monetization Gap"));
        assert!(prompt.contains("\"tldr\""));
    }

    #[test]
    fn test_every_prompt_opens_with_role() {
        let prompts = [
            build_full_analysis_prompt("x", "English", "Google"),
            build_expansion_prompt("x", &[], "English", "Google"),
            build_competitor_prompt("x"),
        ];
        for prompt in &prompts {
            assert!(prompt.starts_with("<ROLE>\nYou are an expert SEO"), "{prompt}");
        }
        assert!(prompts[0].contains("keyword research for MENA markets"));
    }

    #[test]
    fn test_system_instruction_rules() {
        assert!(SYSTEM_INSTRUCTION.contains("Darija"));
        assert!(SYSTEM_INSTRUCTION.contains("Arabizi"));
        assert!(SYSTEM_INSTRUCTION.contains("brand-only navigational"));
        assert!(SYSTEM_INSTRUCTION.contains("40-60 words"));
    }

    #[test]
    fn test_task_sampling_profiles() {
        let full = AnalysisTask::Full.sampling();
        assert_eq!(full.temperature, 0.2);
        assert_eq!(full.top_k, Some(40));
        assert_eq!(full.max_output_tokens, 8192);

        let expansion = AnalysisTask::Expansion.sampling();
        assert_eq!(expansion.temperature, 0.4);
        assert_eq!(expansion.top_p, 0.95);
        assert_eq!(expansion.top_k, None);
        assert_eq!(expansion.max_output_tokens, 4096);

        let competitor = AnalysisTask::Competitor.sampling();
        assert_eq!(competitor.top_k, Some(40));
        assert_eq!(competitor.max_output_tokens, 4096);
    }
}
