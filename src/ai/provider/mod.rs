//! LLM Provider Abstraction
//!
//! Defines the LlmProvider trait for JSON-mode text generation.
//! A provider performs exactly one request per `generate` call and never
//! retries; retry policy belongs to the caller (see `ai::retry`).

mod openai;
#[cfg(test)]
pub(crate) mod stub;

pub use openai::OpenAiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::prompt::RenderedPrompt;
use crate::config::LlmConfig;
use crate::types::{ModelOverrides, Result, SentimentError};

// =============================================================================
// LLM Response with Usage Metrics
// =============================================================================

/// Raw provider response: unparsed text plus usage counters
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Response text exactly as returned (expected to be JSON)
    pub content: String,
    /// Token usage, when the provider reports it
    pub usage: Option<TokenUsage>,
    /// Response timing
    pub timing: ResponseTiming,
    /// Provider and model info
    pub metadata: ResponseMetadata,
}

impl LlmResponse {
    /// Create response with content only (usage unknown)
    pub fn content_only(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: None,
            timing: ResponseTiming::default(),
            metadata: ResponseMetadata::default(),
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// Token usage reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens (prompt)
    pub input_tokens: u32,
    /// Output tokens (completion)
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Total tokens used (input + output)
    pub fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Response timing metrics
#[derive(Debug, Clone, Default)]
pub struct ResponseTiming {
    /// Total response time in milliseconds (wall clock)
    pub total_ms: u64,
}

impl ResponseTiming {
    pub fn from_duration(duration: Duration) -> Self {
        Self {
            total_ms: duration.as_millis() as u64,
        }
    }
}

/// Response metadata
#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    /// Model used
    pub model: String,
    /// Provider name
    pub provider: String,
}

/// Shared LLM provider type; analyses for different businesses may share one
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

// =============================================================================
// Model Parameters
// =============================================================================

/// Per-call model parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl ModelParams {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Apply per-request overrides
    pub fn with_overrides(mut self, overrides: &ModelOverrides) -> Self {
        if let Some(model) = &overrides.model {
            self.model = model.clone();
        }
        if let Some(temperature) = overrides.temperature {
            self.temperature = temperature;
        }
        if let Some(max_tokens) = overrides.max_tokens {
            self.max_tokens = max_tokens;
        }
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.timeout = Duration::from_millis(timeout_ms);
        }
        self
    }
}

impl Default for ModelParams {
    fn default() -> Self {
        Self::from_config(&LlmConfig::default())
    }
}

// =============================================================================
// LLM Provider Trait
// =============================================================================

/// LLM provider for JSON-mode generation with usage metrics
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Issue one request and return the raw response text.
    ///
    /// Transport failures are returned already classified
    /// (`Timeout`, `RateLimited`, `Unknown`).
    async fn generate(&self, prompt: &RenderedPrompt, params: &ModelParams)
    -> Result<LlmResponse>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Whether a credential is present
    fn is_configured(&self) -> bool {
        true
    }
}

/// Create a shared provider from configuration
pub fn create_provider(config: &LlmConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiProvider::new(config)?)),
        other => Err(SentimentError::config(format!(
            "Unknown provider: {}. Supported: openai",
            other
        ))),
    }
}
