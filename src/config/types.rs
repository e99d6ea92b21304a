//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Configuration is read once at startup and injected into the analyzer;
//! nothing here is mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::constants::{analysis, model, pricing};
use crate::types::{Result, SentimentError};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Model service settings
    pub llm: LlmConfig,

    /// Token pricing and pre-flight estimation
    pub pricing: PricingConfig,

    /// Request preconditions
    pub analysis: AnalysisConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            pricing: PricingConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `SentimentError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(SentimentError::config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_ms == 0 {
            return Err(SentimentError::config(
                "LLM timeout_ms must be greater than 0",
            ));
        }

        if self.llm.max_tokens == 0 {
            return Err(SentimentError::config(
                "LLM max_tokens must be greater than 0",
            ));
        }

        if self.llm.model.trim().is_empty() {
            return Err(SentimentError::config("LLM model must not be empty"));
        }

        url::Url::parse(&self.llm.api_base).map_err(|e| {
            SentimentError::config(format!("Invalid api_base '{}': {}", self.llm.api_base, e))
        })?;

        if self.pricing.input_cost_per_1k < 0.0 || self.pricing.output_cost_per_1k < 0.0 {
            return Err(SentimentError::config("Token prices must not be negative"));
        }

        if !(0.0..1.0).contains(&self.pricing.estimate_band) {
            return Err(SentimentError::config(format!(
                "Estimate band must be in [0.0, 1.0), got {}",
                self.pricing.estimate_band
            )));
        }

        if self.analysis.min_reviews < analysis::MIN_REVIEWS {
            return Err(SentimentError::config(format!(
                "analysis.min_reviews must be at least {}, got {}",
                analysis::MIN_REVIEWS,
                self.analysis.min_reviews
            )));
        }

        Ok(())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

/// Model service configuration
///
/// The API key is never serialized and is redacted in debug output.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("openai" speaks any OpenAI-compatible endpoint)
    pub provider: String,

    /// Model name
    pub model: String,

    /// Temperature for generation; low values keep analyses stable
    pub temperature: f32,

    /// Maximum output tokens
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,

    /// API base URL
    pub api_base: String,

    /// API key; falls back to OPENAI_API_KEY
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_ms", &self.timeout_ms)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: model::DEFAULT_MODEL.to_string(),
            temperature: model::DEFAULT_TEMPERATURE,
            max_tokens: model::DEFAULT_MAX_TOKENS,
            timeout_ms: model::DEFAULT_TIMEOUT_MS,
            api_base: model::DEFAULT_API_BASE.to_string(),
            api_key: None,
        }
    }
}

// =============================================================================
// Pricing Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// USD per 1K prompt tokens
    pub input_cost_per_1k: f64,

    /// USD per 1K completion tokens
    pub output_cost_per_1k: f64,

    /// Average prompt tokens per review (pre-flight estimate)
    pub avg_tokens_per_review: u32,

    /// Fixed prompt tokens (pre-flight estimate)
    pub prompt_overhead_tokens: u32,

    /// Expected completion tokens (pre-flight estimate)
    pub response_tokens: u32,

    /// Relative width of the estimate band
    pub estimate_band: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            input_cost_per_1k: pricing::INPUT_COST_PER_1K,
            output_cost_per_1k: pricing::OUTPUT_COST_PER_1K,
            avg_tokens_per_review: pricing::AVG_TOKENS_PER_REVIEW,
            prompt_overhead_tokens: pricing::PROMPT_OVERHEAD_TOKENS,
            response_tokens: pricing::RESPONSE_TOKENS,
            estimate_band: pricing::ESTIMATE_BAND,
        }
    }
}

// =============================================================================
// Analysis Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum reviews per analysis; never below `MIN_REVIEWS`
    pub min_reviews: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_reviews: analysis::MIN_REVIEWS,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.llm.temperature, 0.3);
        assert_eq!(config.llm.timeout_ms, 60_000);
        assert_eq!(config.analysis.min_reviews, 10);
    }

    #[test]
    fn test_rejects_min_reviews_below_floor() {
        let mut config = Config::default();
        config.analysis.min_reviews = 5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("min_reviews"));

        config.analysis.min_reviews = 25;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_temperature() {
        let mut config = Config::default();
        config.llm.temperature = 3.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut config = Config::default();
        config.llm.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_api_base() {
        let mut config = Config::default();
        config.llm.api_base = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_key_never_serialized_or_printed() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-secret".to_string());

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));

        let debug = format!("{:?}", config.llm);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
