//! Remote Model Abstraction
//!
//! Defines the `ModelClient` trait the orchestrator talks to. A client makes
//! exactly one remote call per `generate`; retries and credential lookup
//! live above it.
//!
//! ## Modules
//!
//! - `gemini`: Generative Language `generateContent` over REST

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::ModelConfig;
use crate::types::{RemoteError, Result, SerpError};

// =============================================================================
// Request / Response
// =============================================================================

/// Sampling profile sent with each request
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    pub max_output_tokens: u32,
}

/// One generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub system_instruction: String,
    /// Let the model ground its answer with web search
    pub search_grounding: bool,
    pub sampling: SamplingParams,
}

/// Web reference attached to a grounding chunk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSource {
    pub uri: Option<String>,
    pub title: Option<String>,
}

/// Grounding metadata chunk; only chunks with a `web` reference become citations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundingChunk {
    pub web: Option<WebSource>,
}

impl GroundingChunk {
    pub fn web(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            web: Some(WebSource {
                uri: Some(uri.into()),
                title: Some(title.into()),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    /// Concatenated text of the first candidate; `None` when it produced none
    pub text: Option<String>,
    pub grounding_chunks: Vec<GroundingChunk>,
}

impl ModelResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            grounding_chunks: Vec::new(),
        }
    }

    pub fn with_chunks(mut self, chunks: Vec<GroundingChunk>) -> Self {
        self.grounding_chunks = chunks;
        self
    }
}

// =============================================================================
// Model Client Trait
// =============================================================================

#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send one generation request.
    ///
    /// The key is passed per call; clients never store credentials.
    async fn generate(
        &self,
        api_key: &SecretString,
        request: &GenerationRequest,
    ) -> std::result::Result<ModelResponse, RemoteError>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Shared client type for concurrent use across calls.
pub type SharedModelClient = Arc<dyn ModelClient>;

/// Create a shared client from configuration
pub fn create_client(config: &ModelConfig) -> Result<SharedModelClient> {
    match config.provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiClient::new(config)?)),
        _ => Err(SerpError::Config(format!(
            "Unknown provider: {}. Supported: gemini",
            config.provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client() {
        let client = create_client(&ModelConfig::default()).unwrap();
        assert_eq!(client.name(), "gemini");
    }

    #[test]
    fn test_unknown_provider() {
        let config = ModelConfig {
            provider: "openai".to_string(),
            ..Default::default()
        };
        assert!(matches!(create_client(&config), Err(SerpError::Config(_))));
    }

    #[test]
    fn test_sampling_serialization() {
        let sampling = SamplingParams {
            temperature: 0.4,
            top_p: 0.95,
            top_k: None,
            max_output_tokens: 4096,
        };
        let json = serde_json::to_value(sampling).unwrap();
        assert_eq!(json["maxOutputTokens"], 4096);
        assert!(json.get("topK").is_none());
    }
}
