//! Gemini API Client
//!
//! Calls the Generative Language `generateContent` endpoint over REST.
//! One request per call; failures come back as `RemoteError` with whatever
//! status and code the endpoint reported so the retry controller can
//! classify them.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

use super::{GenerationRequest, GroundingChunk, ModelClient, ModelResponse, SamplingParams};
use crate::config::ModelConfig;
use crate::types::{RemoteError, Result, SerpError};

const PROVIDER: &str = "gemini";

/// Gemini REST client. Holds no credentials; the key arrives per call.
pub struct GeminiClient {
    api_base: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SerpError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self, model: &str) -> std::result::Result<Url, RemoteError> {
        let raw = format!("{}/models/{}:generateContent", self.api_base, model);
        Url::parse(&raw).map_err(|e| {
            RemoteError::new(format!("Invalid endpoint {}: {}", raw, e)).provider(PROVIDER)
        })
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(
        &self,
        api_key: &SecretString,
        request: &GenerationRequest,
    ) -> std::result::Result<ModelResponse, RemoteError> {
        info!(
            "Generating with Gemini (model: {}, temperature: {})",
            request.model, request.sampling.temperature
        );

        let start_time = Instant::now();
        let url = self.endpoint(&request.model)?;
        let body = GenerateContentRequest::from_request(request);

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                RemoteError::new(format!("Gemini request failed: {}", e)).provider(PROVIDER)
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            RemoteError::new(format!("Failed to read Gemini response: {}", e)).provider(PROVIDER)
        })?;

        debug!(
            status = status.as_u16(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Received response from Gemini"
        );

        if !status.is_success() {
            return Err(parse_error(status.as_u16(), &text));
        }

        parse_response(&text)
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

/// Decode the `{error: {code, message, status}}` envelope; fall back to the raw body.
fn parse_error(status: u16, body: &str) -> RemoteError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error);

    let err = match envelope {
        Some(detail) => {
            let message = detail
                .message
                .unwrap_or_else(|| format!("HTTP {}", status));
            let err = RemoteError::new(message).with_status(detail.code.unwrap_or(status));
            match detail.status {
                Some(code) => err.with_code(code),
                None => err,
            }
        }
        None if body.trim().is_empty() => {
            RemoteError::new(format!("HTTP {}", status)).with_status(status)
        }
        None => RemoteError::new(body.trim().to_string()).with_status(status),
    };

    err.provider(PROVIDER)
}

fn parse_response(body: &str) -> std::result::Result<ModelResponse, RemoteError> {
    let parsed: GenerateContentResponse = serde_json::from_str(body).map_err(|e| {
        RemoteError::new(format!("Failed to parse Gemini response: {}", e)).provider(PROVIDER)
    })?;

    let Some(candidate) = parsed.candidates.into_iter().next() else {
        return Ok(ModelResponse::default());
    };

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    Ok(ModelResponse {
        text: (!text.is_empty()).then_some(text),
        grounding_chunks: candidate
            .grounding_metadata
            .map(|m| m.grounding_chunks)
            .unwrap_or_default(),
    })
}

// Request/Response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    generation_config: SamplingParams,
}

impl GenerateContentRequest {
    fn from_request(request: &GenerationRequest) -> Self {
        let tools = if request.search_grounding {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        };

        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::text(&request.prompt)],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part::text(&request.system_instruction)],
            },
            tools,
            generation_config: request.sampling,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GroundingMetadata {
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: Option<u16>,
    message: Option<String>,
    status: Option<String>,
}
