//! Analysis documents: the typed model, lenient parsing, merging of
//! expansions, and read-side insights.

pub mod insights;
pub mod lenient;
pub mod merge;
pub mod model;

pub use insights::{
    KdBand, KeywordCoverage, RankedKeyword, clamp_score, keyword_coverage, ranked_keywords,
    unique_keywords,
};
pub use merge::merge;
pub use model::{
    AnalysisDocument, Citation, Cluster, CompetitorAnalysisResult, CompetitorPage, ContentGaps,
    ContentScore, ContentType, DiscoveryBundle, DiscoveryRow, Discussion, DiscussionPlatform,
    FunnelStage, JourneyStage, Keyword, KeywordLanguage, PartialAnalysisDocument, Recommendation,
    SearchIntent, Sentiment,
};
