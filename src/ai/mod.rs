//! AI Integration Layer
//!
//! Everything between an orchestrator operation and the remote model:
//! prompt construction, the model client boundary, transient-failure
//! retry, and normalization of the raw text into typed documents.

pub mod normalize;
pub mod prompt;
pub mod provider;
pub mod retry;

pub use normalize::normalize;
pub use prompt::{AnalysisTask, PromptBuilder, PromptSection};
pub use provider::{
    GeminiClient, GenerationRequest, GroundingChunk, ModelClient, ModelResponse, SamplingParams,
    SharedModelClient, WebSource, create_client,
};
pub use retry::{RetryPolicy, retry};
