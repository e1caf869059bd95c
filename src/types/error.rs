//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//! Provides the single classification point used for retry decisions.
//!
//! ## Failure Classes
//!
//! - **RateLimit**: quota exhausted at the model endpoint (wait and retry)
//! - **Overload**: upstream temporarily overloaded (wait and retry)
//! - **Terminal**: anything else, surfaced immediately
//!
//! ## Design Principles
//!
//! - Single error type (SerpError) for the library surface
//! - Substring heuristics live only in `ErrorClassifier`
//! - Callers can always tell quota exhaustion apart from other failures

use std::fmt;

use thiserror::Error;

// =============================================================================
// Failure Classes
// =============================================================================

/// Closed set of tags a remote failure is sorted into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Quota or rate limit exceeded (HTTP 429, RESOURCE_EXHAUSTED)
    RateLimit,
    /// Upstream overloaded (HTTP 503)
    Overload,
    /// Not worth retrying
    Terminal,
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Overload => write!(f, "OVERLOAD"),
            Self::Terminal => write!(f, "TERMINAL"),
        }
    }
}

impl FailureClass {
    /// Transient classes are retried by the retry controller
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimit | Self::Overload)
    }
}

/// Anything the retry controller can sort into a `FailureClass`
pub trait Classified {
    fn failure_class(&self) -> FailureClass;
}

// =============================================================================
// Remote Error
// =============================================================================

/// Error raised at the remote model boundary.
///
/// Only `message` is guaranteed; `status` and `code` are filled in when the
/// endpoint (or transport) reports them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    /// HTTP status, when the failure came with a response
    pub status: Option<u16>,
    /// Provider status code such as `RESOURCE_EXHAUSTED`
    pub code: Option<String>,
    /// Human readable message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let provider = self.provider.as_deref().unwrap_or("remote");
        match (self.status, self.code.as_deref()) {
            (Some(status), Some(code)) => {
                write!(f, "[{}:{} {}] {}", provider, status, code, self.message)
            }
            (Some(status), None) => write!(f, "[{}:{}] {}", provider, status, self.message),
            (None, Some(code)) => write!(f, "[{}:{}] {}", provider, code, self.message),
            (None, None) => write!(f, "[{}] {}", provider, self.message),
        }
    }
}

impl std::error::Error for RemoteError {}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: None,
            message: message.into(),
            provider: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Add provider context to existing error
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }
}

impl Classified for RemoteError {
    fn failure_class(&self) -> FailureClass {
        ErrorClassifier::classify(self.status, self.code.as_deref(), &self.message)
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Error classifier for retry routing
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify a failure from whatever the boundary reported.
    ///
    /// Structured fields are checked before message substrings.
    pub fn classify(status: Option<u16>, code: Option<&str>, message: &str) -> FailureClass {
        if status == Some(429) || code.is_some_and(|c| c.eq_ignore_ascii_case("RESOURCE_EXHAUSTED"))
        {
            return FailureClass::RateLimit;
        }
        if status == Some(503) {
            return FailureClass::Overload;
        }

        let lower = message.to_lowercase();

        if lower.contains("429") || lower.contains("quota") || lower.contains("resource_exhausted")
        {
            return FailureClass::RateLimit;
        }

        if lower.contains("503") {
            return FailureClass::Overload;
        }

        FailureClass::Terminal
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum SerpError {
    // -------------------------------------------------------------------------
    // Orchestration Errors
    // -------------------------------------------------------------------------
    #[error("API key is missing: set SERPSCOPE_API_KEY or run 'serpscope key set'")]
    MissingCredentials,

    #[error("Model returned no text")]
    EmptyResponse,

    /// Text was present but did not parse; `raw` keeps the untouched response
    #[error("Malformed model response: {reason}")]
    MalformedResponse { reason: String, raw: String },

    /// A transient failure outlived the retry budget
    #[error("Rate limited ({class}) after exhausting retries: {source}")]
    RateLimited {
        class: FailureClass,
        source: RemoteError,
    },

    #[error("Upstream model error: {0}")]
    Upstream(RemoteError),

    // -------------------------------------------------------------------------
    // System Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SerpError>;

impl SerpError {
    /// Wrap the last error returned by the retry controller.
    pub fn from_remote(err: RemoteError) -> Self {
        match err.failure_class() {
            class if class.is_transient() => Self::RateLimited { class, source: err },
            _ => Self::Upstream(err),
        }
    }

    pub fn malformed(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// The caller should ask the user for an API key
    pub fn needs_credentials(&self) -> bool {
        matches!(self, Self::MissingCredentials)
    }

    /// Remote error behind this failure, if any
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            Self::RateLimited { source, .. } => Some(source),
            Self::Upstream(err) => Some(err),
            _ => None,
        }
    }

    /// Message suitable for end users.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingCredentials => {
                "No API key configured. Run 'serpscope key set <KEY>' or export SERPSCOPE_API_KEY."
            }
            Self::RateLimited { .. } => {
                "API quota exceeded. The request was retried automatically but the limit persists. Please try again in a few minutes or check your plan."
            }
            _ => "Failed to generate intelligence. Please check your configuration and API key and try again.",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
