//! Analysis Orchestrator
//!
//! Runs one analysis task end to end:
//!
//! 1. Resolve the API key (fails fast with `MissingCredentials`)
//! 2. Build the task prompt and sampling profile
//! 3. Call the model through the retry controller
//! 4. Normalize the text into a typed document
//! 5. Attach grounding citations (full analysis and expansion only)
//!
//! Each operation is a single call chain. Dropping the returned future
//! cancels it at the next suspension point (the remote call or a backoff
//! sleep); there is no other cancellation path.

use tracing::{info, instrument, warn};

use crate::ai::normalize::normalize;
use crate::ai::prompt::{
    AnalysisTask, SYSTEM_INSTRUCTION, build_competitor_prompt, build_expansion_prompt,
    build_full_analysis_prompt,
};
use crate::ai::provider::{
    GenerationRequest, GroundingChunk, ModelClient, ModelResponse, SharedModelClient,
    create_client,
};
use crate::ai::retry::{RetryPolicy, retry};
use crate::analysis::{
    AnalysisDocument, Citation, CompetitorAnalysisResult, PartialAnalysisDocument, merge,
};
use crate::config::Config;
use crate::credentials::CredentialResolver;
use crate::types::{Result, SerpError};

pub struct AnalysisOrchestrator {
    client: SharedModelClient,
    credentials: CredentialResolver,
    retry: RetryPolicy,
    model: String,
}

impl AnalysisOrchestrator {
    pub fn new(
        client: SharedModelClient,
        credentials: CredentialResolver,
        retry: RetryPolicy,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            credentials,
            retry,
            model: model.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            create_client(&config.model)?,
            CredentialResolver::from_config(&config.model),
            RetryPolicy::from_config(&config.retry),
            config.model.model.clone(),
        ))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Full keyword intelligence for a topic.
    #[instrument(skip(self), fields(model = %self.model))]
    pub async fn run_full_analysis(
        &self,
        topic: &str,
        language: &str,
        platform: &str,
    ) -> Result<AnalysisDocument> {
        info!("Starting full analysis");

        let prompt = build_full_analysis_prompt(topic, language, platform);
        let response = self.execute(AnalysisTask::Full, prompt).await?;
        let sources = extract_citations(&response.grounding_chunks);
        let text = response_text(response)?;

        let mut document: AnalysisDocument = normalize(&text)?;
        document.sources = sources;

        info!(
            clusters = document.clusters.len(),
            keywords = document.keyword_count(),
            sources = document.sources.len(),
            "Full analysis complete"
        );
        Ok(document)
    }

    /// New clusters, recommendations, questions and matrix rows that avoid
    /// `existing_clusters`.
    #[instrument(skip(self, existing_clusters), fields(model = %self.model, existing = existing_clusters.len()))]
    pub async fn run_expansion(
        &self,
        topic: &str,
        existing_clusters: &[String],
        language: &str,
        platform: &str,
    ) -> Result<PartialAnalysisDocument> {
        info!("Starting expansion");

        let prompt = build_expansion_prompt(topic, existing_clusters, language, platform);
        let response = self.execute(AnalysisTask::Expansion, prompt).await?;
        let sources = extract_citations(&response.grounding_chunks);
        let text = response_text(response)?;

        let mut partial: PartialAnalysisDocument = normalize(&text)?;
        partial.sources = sources;

        info!(
            clusters = partial.clusters.len(),
            recommendations = partial.recommendations.len(),
            sources = partial.sources.len(),
            "Expansion complete"
        );
        Ok(partial)
    }

    /// SERP competitor study for a single keyword. Carries no citations.
    #[instrument(skip(self), fields(model = %self.model))]
    pub async fn run_competitor_analysis(&self, keyword: &str) -> Result<CompetitorAnalysisResult> {
        info!("Starting competitor analysis");

        let prompt = build_competitor_prompt(keyword);
        let response = self.execute(AnalysisTask::Competitor, prompt).await?;
        let text = response_text(response)?;

        let result: CompetitorAnalysisResult = normalize(&text)?;

        info!(
            competitors = result.competitors.len(),
            kd = result.kd_score,
            "Competitor analysis complete"
        );
        Ok(result)
    }

    /// Expand `base` with fresh clusters and fold the result in.
    pub async fn expand_document(
        &self,
        base: &AnalysisDocument,
        topic: &str,
        language: &str,
        platform: &str,
    ) -> Result<AnalysisDocument> {
        let partial = self
            .run_expansion(topic, &base.cluster_names(), language, platform)
            .await?;
        Ok(merge(base, &partial))
    }

    // =========================================================================
    // Internal
    // =========================================================================

    async fn execute(&self, task: AnalysisTask, prompt: String) -> Result<ModelResponse> {
        // Re-resolved per call so a key set mid-session is picked up
        let api_key = self.credentials.resolve()?;

        let request = GenerationRequest {
            model: self.model.clone(),
            prompt,
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            search_grounding: true,
            sampling: task.sampling(),
        };

        let client = &self.client;
        let request = &request;
        let api_key = &api_key;

        retry(&self.retry, move || client.generate(api_key, request))
            .await
            .map_err(|err| {
                warn!(
                    task = task.as_str(),
                    provider = client.name(),
                    error = %err,
                    "Model call failed"
                );
                SerpError::from_remote(err)
            })
    }
}

fn response_text(response: ModelResponse) -> Result<String> {
    match response.text {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(SerpError::EmptyResponse),
    }
}

/// Web references in grounding order; chunks without one are skipped.
fn extract_citations(chunks: &[GroundingChunk]) -> Vec<Citation> {
    chunks
        .iter()
        .filter_map(|chunk| chunk.web.as_ref())
        .map(|web| Citation {
            title: web.title.clone().unwrap_or_default(),
            uri: web.uri.clone().unwrap_or_default(),
        })
        .collect()
}
