//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Retry controller constants
pub mod retry {
    /// Attempts per remote call, including the first
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    /// Delay before the first retry (milliseconds); doubles on each retry
    pub const INITIAL_DELAY_MS: u64 = 2000;
}

/// Sampling profiles per task kind
pub mod sampling {
    /// Full analysis: deterministic-leaning
    pub mod full {
        pub const TEMPERATURE: f32 = 0.2;
        pub const TOP_P: f32 = 0.9;
        pub const TOP_K: u32 = 40;
        pub const MAX_OUTPUT_TOKENS: u32 = 8192;
    }

    /// Expansion: higher temperature to favor novel clusters
    pub mod expansion {
        pub const TEMPERATURE: f32 = 0.4;
        pub const TOP_P: f32 = 0.95;
        pub const MAX_OUTPUT_TOKENS: u32 = 4096;
    }

    /// Competitor analysis
    pub mod competitor {
        pub const TEMPERATURE: f32 = 0.2;
        pub const TOP_P: f32 = 0.9;
        pub const TOP_K: u32 = 40;
        pub const MAX_OUTPUT_TOKENS: u32 = 4096;
    }
}

/// Remote model constants
pub mod model {
    /// Default model identifier
    pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

    /// Generative Language REST base
    pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

    /// Per-request transport timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Environment variables checked for an API key, in order
    pub const API_KEY_ENV_VARS: &[&str] = &["SERPSCOPE_API_KEY", "GEMINI_API_KEY", "API_KEY"];
}

/// Prompt content constants
pub mod prompt {
    /// Market every prompt targets
    pub const TARGET_REGION: &str = "North Africa (Morocco/MENA)";

    /// Items requested per full analysis
    pub const PEOPLE_ALSO_ASK: usize = 5;
    pub const PAIN_POINTS: usize = 5;
    pub const LONG_TAIL_KEYWORDS: usize = 15;

    /// Items requested per expansion
    pub const NEW_CLUSTERS: usize = 3;
    pub const NEW_RECOMMENDATIONS: usize = 3;
    pub const NEW_QUESTIONS: usize = 5;
    pub const NEW_MATRIX_ROWS: usize = 5;

    /// Ranking pages scored per competitor analysis
    pub const COMPETITOR_PAGES: usize = 5;
}

/// Document insight thresholds
pub mod insights {
    /// KD at or above this is hard to rank for
    pub const KD_HARD: f64 = 60.0;

    /// KD at or above this is medium difficulty
    pub const KD_MEDIUM: f64 = 40.0;

    /// Upper bound of 0-5 content scores
    pub const SCORE_MAX: f64 = 5.0;

    /// Upper bound of 0-100 scores (KD, domain authority)
    pub const PERCENT_MAX: f64 = 100.0;
}

/// Defaults for the CLI inputs
pub mod defaults {
    pub const LANGUAGE: &str = "English";
    pub const PLATFORM: &str = "Google";
}

/// Terminal report limits
pub mod report {
    /// Keywords listed in an analysis summary
    pub const TOP_KEYWORDS: usize = 10;
}
