//! reviewlens - LLM Sentiment Analysis for Customer Reviews
//!
//! Turns a business's customer reviews into a validated, structured
//! sentiment analysis: summary and breakdown, recurring themes with
//! verbatim supporting quotes, and improvement ideas grounded in those themes.
//!
//! ## Core Features
//!
//! - **Bounded Prompting**: reviews compressed to the fields the model needs
//! - **Strict Validation**: model output is accepted as-is or rejected with
//!   every violation listed; never repaired
//! - **Typed Failures**: a closed error taxonomy with retry guidance
//! - **Cost Tracking**: per-call token cost and pre-flight estimates
//!
//! ## Quick Start
//!
//! ```ignore
//! use reviewlens::{AnalysisRequest, ConfigLoader, SentimentAnalyzer};
//!
//! let config = ConfigLoader::load()?;
//! let analyzer = SentimentAnalyzer::from_config(&config)?;
//! let request = AnalysisRequest::new(reviews, "Blue Door Bakery", 240);
//! let outcome = analyzer.analyze(&request).await?;
//! println!("{}", outcome.metrics.display());
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: compression, prompts, provider, validation, metrics, retry
//! - [`types`]: request/result types and the error taxonomy
//! - [`config`]: layered configuration
//! - [`cli`]: command implementations for the `reviewlens` binary

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{AnalysisConfig, Config, ConfigLoader, LlmConfig, PricingConfig};

// Error Types
pub use types::error::{
    ErrorClassifier, ErrorKind, Result, SentimentError, ValidationError, ValidationErrorKind,
};

// Request / Result Types
pub use types::{
    AnalysisRequest, ModelOverrides, OverallLabel, ReviewForAnalysis, SentimentAnalysisResult,
    ThemeSentiment,
};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use ai::{
    AnalysisMetrics, AnalysisOutcome, CostEstimator, CostRates, LlmProvider, OpenAiProvider,
    RetryPolicy, SentimentAnalyzer, SentimentValidator, TokenCostEstimate, ValidationContext,
    ValidationOutcome, analyze_with_retry, estimate_token_cost, validate_response,
};
