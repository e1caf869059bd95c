//! SerpScope - Grounded Keyword Research for SEO Content Strategy
//!
//! Turns a topic into keyword intelligence (clusters, content
//! recommendations, community discovery) by prompting a search-grounded
//! generative model, and grows saved analyses with non-overlapping
//! expansions.
//!
//! ## Core Features
//!
//! - **Full Analysis**: clusters, recommendations and deep discovery for a topic
//! - **Incremental Expansion**: new clusters merged onto a saved document
//! - **Competitor Analysis**: SERP study for a single keyword
//! - **Quota-Aware Retry**: exponential backoff on rate limits and overload
//!
//! ## Quick Start
//!
//! ```ignore
//! use serpscope::{AnalysisOrchestrator, ConfigLoader};
//!
//! let config = ConfigLoader::load()?;
//! let orchestrator = AnalysisOrchestrator::from_config(&config)?;
//! let document = orchestrator
//!     .run_full_analysis("vélo électrique", "French", "Google")
//!     .await?;
//! let expanded = orchestrator
//!     .expand_document(&document, "vélo électrique", "French", "Google")
//!     .await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: prompts, model client boundary, retry, response normalization
//! - [`analysis`]: document model, merge engine, insights
//! - [`orchestrator`]: end-to-end analysis operations
//! - [`credentials`]: API key resolution and storage
//! - [`config`]: layered configuration

pub mod ai;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod orchestrator;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{FailureClass, RemoteError, Result, SerpError};

// Orchestration
pub use credentials::{CredentialResolver, KeyStore};
pub use orchestrator::AnalysisOrchestrator;

// =============================================================================
// Document Re-exports
// =============================================================================

pub use analysis::{
    AnalysisDocument, CompetitorAnalysisResult, PartialAnalysisDocument, merge,
};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{GeminiClient, ModelClient, RetryPolicy, SharedModelClient};
