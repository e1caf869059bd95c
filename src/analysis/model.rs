//! Analysis Document Model
//!
//! Typed mirror of the JSON contract the prompts ask the model for.
//! Wire names are camelCase. Every field is optional at the boundary, and
//! enumerated tags are open: values outside the documented set are kept
//! verbatim in an `Other` variant instead of failing the parse.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::lenient;

// =============================================================================
// Open Enumerations
// =============================================================================

/// Define a string tag with a documented set of values and a verbatim
/// fallback for everything else.
macro_rules! open_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            /// Value outside the documented set, kept verbatim
            Other(String),
        }

        impl $name {
            /// Display label; unknown values render as received
            pub fn label(&self) -> &str {
                match self {
                    $(Self::$variant => $label,)+
                    Self::Other(raw) => raw.as_str(),
                }
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, Self::Other(_))
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                let trimmed = raw.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($label) {
                        return Self::$variant;
                    }
                )+
                Self::Other(raw.to_string())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::Other(String::new())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = lenient::text(deserializer)?;
                Ok(Self::from(raw.as_str()))
            }
        }
    };
}

open_enum!(
    /// Linguistic variant a keyword is written in
    KeywordLanguage {
        English => "English",
        French => "French",
        Msa => "MSA",
        Darija => "Darija",
        Transliterated => "Transliterated",
        Mixed => "Mixed",
    }
);

open_enum!(
    /// Search intent behind a keyword
    SearchIntent {
        Informational => "Informational",
        Transactional => "Transactional",
        Navigational => "Navigational",
        Commercial => "Commercial",
    }
);

open_enum!(
    /// Format of a recommended piece of content
    ContentType {
        Blog => "Blog",
        LandingPage => "Landing Page",
        Guide => "Guide",
        Technical => "Technical",
    }
);

open_enum!(
    /// Funnel position of a recommendation
    FunnelStage {
        Tofu => "TOFU",
        Mofu => "MOFU",
        Bofu => "BOFU",
    }
);

open_enum!(
    /// Customer journey stage of a discovery matrix row
    JourneyStage {
        Awareness => "Awareness",
        Consideration => "Consideration",
        Conversion => "Conversion",
        Retention => "Retention",
    }
);

open_enum!(
    /// Community a discussion was found on
    DiscussionPlatform {
        Reddit => "Reddit",
        Quora => "Quora",
        Forum => "Other",
    }
);

open_enum!(
    /// Tone of a community discussion
    Sentiment {
        Positive => "Positive",
        Negative => "Negative",
        Neutral => "Neutral",
        Controversial => "Controversial",
    }
);

// =============================================================================
// Analysis Document
// =============================================================================

/// Full keyword intelligence for one topic.
///
/// Created by a full analysis and grown by merging expansions; never
/// patched in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisDocument {
    #[serde(deserialize_with = "lenient::text")]
    pub executive_summary: String,
    #[serde(deserialize_with = "lenient::list")]
    pub clusters: Vec<Cluster>,
    #[serde(deserialize_with = "lenient::list")]
    pub recommendations: Vec<Recommendation>,
    #[serde(deserialize_with = "lenient::object")]
    pub deep_discovery: DiscoveryBundle,
    /// Grounding citations in discovery order; duplicates allowed
    #[serde(deserialize_with = "lenient::list")]
    pub sources: Vec<Citation>,
}

impl AnalysisDocument {
    /// Cluster names in document order, as passed to an expansion prompt
    pub fn cluster_names(&self) -> Vec<String> {
        self.clusters.iter().map(|c| c.name.clone()).collect()
    }

    pub fn keyword_count(&self) -> usize {
        self.clusters.iter().map(|c| c.keywords.len()).sum()
    }
}

/// Additions produced by an expansion. Carries no executive summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialAnalysisDocument {
    #[serde(deserialize_with = "lenient::list")]
    pub clusters: Vec<Cluster>,
    #[serde(deserialize_with = "lenient::list")]
    pub recommendations: Vec<Recommendation>,
    #[serde(deserialize_with = "lenient::optional")]
    pub deep_discovery: Option<DiscoveryBundle>,
    #[serde(deserialize_with = "lenient::list")]
    pub sources: Vec<Citation>,
}

/// A content hub: semantically related keywords sharing intent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Cluster {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(deserialize_with = "lenient::text")]
    pub primary_intent: String,
    /// 0-5
    #[serde(deserialize_with = "lenient::number")]
    pub business_relevance: f64,
    #[serde(deserialize_with = "lenient::text")]
    pub total_volume_est: String,
    #[serde(deserialize_with = "lenient::list")]
    pub keywords: Vec<Keyword>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Keyword {
    #[serde(deserialize_with = "lenient::text")]
    pub term: String,
    /// Estimated label such as "High" or "1.2k"
    #[serde(deserialize_with = "lenient::text")]
    pub volume: String,
    /// Keyword difficulty, 0-100
    #[serde(deserialize_with = "lenient::number")]
    pub kd: f64,
    pub language: KeywordLanguage,
    pub intent: SearchIntent,
    #[serde(deserialize_with = "lenient::text")]
    pub current_rank_leader: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub funnel_stage: FunnelStage,
    /// 40-60 word direct answer block
    #[serde(deserialize_with = "lenient::text")]
    pub ai_answer: String,
    #[serde(deserialize_with = "lenient::strings")]
    pub outline: Vec<String>,
    #[serde(deserialize_with = "lenient::object")]
    pub score: ContentScore,
}

/// Content quality scores, each 0-5
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentScore {
    #[serde(deserialize_with = "lenient::number")]
    pub depth: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub eeat: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub tech_speed: f64,
}

// =============================================================================
// Deep Discovery
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiscoveryBundle {
    /// Content gaps where current results are poor
    #[serde(deserialize_with = "lenient::strings")]
    pub pain_points: Vec<String>,
    #[serde(deserialize_with = "lenient::strings")]
    pub people_also_ask: Vec<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub discussions: Vec<Discussion>,
    #[serde(deserialize_with = "lenient::list")]
    pub matrix: Vec<DiscoveryRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Discussion {
    pub platform: DiscussionPlatform,
    #[serde(deserialize_with = "lenient::text")]
    pub topic: String,
    pub sentiment: Sentiment,
    #[serde(deserialize_with = "lenient::text")]
    pub snippet: String,
}

/// One long-tail keyword of the discovery matrix
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiscoveryRow {
    #[serde(deserialize_with = "lenient::text")]
    pub term: String,
    #[serde(deserialize_with = "lenient::text")]
    pub intent: String,
    /// "Rising", "Stable", "Seasonal", ...
    #[serde(deserialize_with = "lenient::text")]
    pub search_trend: String,
    #[serde(deserialize_with = "lenient::text")]
    pub pain_point: String,
    pub funnel_stage: JourneyStage,
}

/// Web source the model grounded its answer on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Citation {
    #[serde(deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(deserialize_with = "lenient::text")]
    pub uri: String,
}

// =============================================================================
// Competitor Analysis
// =============================================================================

/// Standalone SERP competitor study for one keyword. Never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompetitorAnalysisResult {
    #[serde(deserialize_with = "lenient::text")]
    pub keyword: String,
    /// 0-100
    #[serde(deserialize_with = "lenient::number")]
    pub kd_score: f64,
    #[serde(deserialize_with = "lenient::list")]
    pub competitors: Vec<CompetitorPage>,
    #[serde(deserialize_with = "lenient::object")]
    pub gaps: ContentGaps,
    #[serde(deserialize_with = "lenient::text")]
    pub strategy_narrative: String,
    #[serde(deserialize_with = "lenient::text")]
    pub summary: String,
    #[serde(deserialize_with = "lenient::text")]
    pub tldr: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompetitorPage {
    #[serde(deserialize_with = "lenient::text")]
    pub url: String,
    #[serde(deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(deserialize_with = "lenient::number")]
    pub content_depth: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub eeat: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub tech_speed: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub est_ref_domains: f64,
    /// 0-100
    #[serde(deserialize_with = "lenient::number")]
    pub domain_authority: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub on_page_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentGaps {
    #[serde(deserialize_with = "lenient::strings")]
    pub information: Vec<String>,
    #[serde(deserialize_with = "lenient::strings")]
    pub structural: Vec<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub monetization: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RESPONSE: &str = r#"{
        "executiveSummary": "E-bike maintenance is underserved in French.",
        "deepDiscovery": {
            "painPoints": ["slow charging"],
            "peopleAlsoAsk": ["Comment réparer un vélo électrique ?"],
            "discussions": [{"platform": "Reddit", "topic": "Batteries", "sentiment": "Negative", "snippet": "..."}],
            "matrix": [{"term": "batterie vélo", "intent": "Commercial", "searchTrend": "Rising", "painPoint": "prix", "funnelStage": "Consideration"}]
        },
        "clusters": [{
            "name": "Entretien",
            "description": "Maintenance and repair",
            "primaryIntent": "Informational",
            "businessRelevance": 4,
            "totalVolumeEst": "12k",
            "keywords": [{"term": "réparer vélo électrique", "volume": "High", "kd": 35, "language": "French", "intent": "Informational", "currentRankLeader": "decathlon.fr"}]
        }],
        "recommendations": [{
            "title": "Guide complet",
            "type": "Landing Page",
            "funnelStage": "MOFU",
            "aiAnswer": "Direct answer.",
            "outline": ["Diagnose", "Repair"],
            "score": {"depth": 4, "eeat": 3.5, "techSpeed": 5}
        }]
    }"#;

    #[test]
    fn test_parse_full_document() {
        let doc: AnalysisDocument = serde_json::from_str(FULL_RESPONSE).unwrap();

        assert_eq!(doc.clusters[0].name, "Entretien");
        assert_eq!(doc.clusters[0].business_relevance, 4.0);
        let keyword = &doc.clusters[0].keywords[0];
        assert_eq!(keyword.kd, 35.0);
        assert_eq!(keyword.language, KeywordLanguage::French);
        assert_eq!(keyword.intent, SearchIntent::Informational);
        assert_eq!(doc.recommendations[0].content_type, ContentType::LandingPage);
        assert_eq!(doc.recommendations[0].funnel_stage, FunnelStage::Mofu);
        assert_eq!(doc.recommendations[0].score.tech_speed, 5.0);
        assert_eq!(
            doc.deep_discovery.matrix[0].funnel_stage,
            JourneyStage::Consideration
        );
        assert!(doc.sources.is_empty());
    }

    #[test]
    fn test_unknown_enum_values_survive() {
        let keyword: Keyword =
            serde_json::from_str(r#"{"term": "x", "language": "Tamazight", "intent": "Local"}"#)
                .unwrap();
        assert_eq!(
            keyword.language,
            KeywordLanguage::Other("Tamazight".to_string())
        );
        assert!(!keyword.intent.is_known());
        assert_eq!(keyword.intent.label(), "Local");

        let json = serde_json::to_value(&keyword).unwrap();
        assert_eq!(json["language"], "Tamazight");
    }

    #[test]
    fn test_enum_matching_is_case_insensitive() {
        assert_eq!(FunnelStage::from("tofu"), FunnelStage::Tofu);
        assert_eq!(ContentType::from(" landing page "), ContentType::LandingPage);
        assert_eq!(DiscussionPlatform::from("Other"), DiscussionPlatform::Forum);
    }

    #[test]
    fn test_nulls_do_not_fail_parse() {
        let doc: AnalysisDocument = serde_json::from_str(
            r#"{"executiveSummary": null, "clusters": null, "deepDiscovery": null, "sources": null}"#,
        )
        .unwrap();
        assert!(doc.executive_summary.is_empty());
        assert!(doc.clusters.is_empty());
        assert_eq!(doc.deep_discovery, DiscoveryBundle::default());
    }

    #[test]
    fn test_serializes_camel_case() {
        let doc: AnalysisDocument = serde_json::from_str(FULL_RESPONSE).unwrap();
        let json = serde_json::to_value(&doc).unwrap();

        assert!(json.get("executiveSummary").is_some());
        assert_eq!(json["clusters"][0]["keywords"][0]["currentRankLeader"], "decathlon.fr");
        assert_eq!(json["recommendations"][0]["type"], "Landing Page");
        assert_eq!(json["deepDiscovery"]["peopleAlsoAsk"][0], "Comment réparer un vélo électrique ?");
    }

    #[test]
    fn test_cluster_names() {
        let doc: AnalysisDocument = serde_json::from_str(FULL_RESPONSE).unwrap();
        assert_eq!(doc.cluster_names(), vec!["Entretien".to_string()]);
        assert_eq!(doc.keyword_count(), 1);
    }

    #[test]
    fn test_partial_document_ignores_summary() {
        let partial: PartialAnalysisDocument = serde_json::from_str(
            r#"{"executiveSummary": "ignored", "clusters": [{"name": "Batteries"}]}"#,
        )
        .unwrap();
        assert_eq!(partial.clusters[0].name, "Batteries");
        assert!(partial.deep_discovery.is_none());
    }

    #[test]
    fn test_nested_shape_mismatches_do_not_fail_parse() {
        let doc: AnalysisDocument = serde_json::from_str(
            r#"{"clusters": [{"name": "Entretien", "keywords": "réparer vélo, batterie"}]}"#,
        )
        .unwrap();
        assert_eq!(doc.clusters[0].name, "Entretien");
        assert!(doc.clusters[0].keywords.is_empty());

        let doc: AnalysisDocument =
            serde_json::from_str(r#"{"recommendations": [{"title": "G", "score": 4}]}"#).unwrap();
        assert_eq!(doc.recommendations[0].title, "G");
        assert_eq!(doc.recommendations[0].score, ContentScore::default());

        let result: CompetitorAnalysisResult = serde_json::from_str(
            r#"{"competitors": ["https://a.example", {"url": "https://b.example"}], "gaps": "none"}"#,
        )
        .unwrap();
        assert_eq!(result.competitors.len(), 1);
        assert_eq!(result.competitors[0].url, "https://b.example");
        assert_eq!(result.gaps, ContentGaps::default());

        let partial: PartialAnalysisDocument =
            serde_json::from_str(r#"{"deepDiscovery": ["q"], "clusters": 3}"#).unwrap();
        assert!(partial.deep_discovery.is_none());
        assert!(partial.clusters.is_empty());
    }

    #[test]
    fn test_parse_competitor_result() {
        let result: CompetitorAnalysisResult = serde_json::from_str(
            r#"{
                "keyword": "vélo électrique",
                "kdScore": "48",
                "competitors": [{"url": "https://a.example", "title": "A", "contentDepth": 4, "eeat": 3, "techSpeed": 2, "estRefDomains": 320, "domainAuthority": 61, "onPageScore": 4}],
                "gaps": {"information": ["pricing"], "structural": ["no FAQ"], "monetization": "no affiliate links"},
                "strategyNarrative": "Go deep.",
                "summary": "Moderate.",
                "tldr": "Doable."
            }"#,
        )
        .unwrap();

        assert_eq!(result.kd_score, 48.0);
        assert_eq!(result.competitors[0].est_ref_domains, 320.0);
        assert_eq!(result.gaps.structural, vec!["no FAQ"]);
    }
}
