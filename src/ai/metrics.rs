//! Analysis Metrics and Cost Estimation
//!
//! Token accounting and cost for a completed analysis, plus a pre-flight
//! estimator that predicts a token/cost band from a review count alone.
//!
//! ## Usage
//!
//! ```ignore
//! let estimate = estimate_token_cost(120);
//! println!("{}", estimate.display());
//!
//! let metrics = AnalysisMetrics::record(started_at, elapsed, usage, 18, &CostRates::default());
//! println!("{}", metrics.display());
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use crate::ai::provider::TokenUsage;
use crate::config::PricingConfig;
use crate::constants::pricing;

// =============================================================================
// Cost Rates
// =============================================================================

/// USD per 1000 tokens, injected from configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostRates {
    pub input_per_1k: f64,
    pub output_per_1k: f64,
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            input_per_1k: pricing::INPUT_COST_PER_1K,
            output_per_1k: pricing::OUTPUT_COST_PER_1K,
        }
    }
}

impl CostRates {
    pub fn new(input_per_1k: f64, output_per_1k: f64) -> Self {
        Self {
            input_per_1k,
            output_per_1k,
        }
    }

    pub fn from_config(config: &PricingConfig) -> Self {
        Self::new(config.input_cost_per_1k, config.output_cost_per_1k)
    }

    /// Cost of a prompt/completion token pair
    pub fn cost(&self, prompt_tokens: f64, completion_tokens: f64) -> f64 {
        (prompt_tokens / 1000.0) * self.input_per_1k
            + (completion_tokens / 1000.0) * self.output_per_1k
    }
}

// =============================================================================
// Per-Analysis Metrics
// =============================================================================

/// Token counts and their estimated cost
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCost {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    pub estimated_cost_usd: f64,
}

impl TokenCost {
    pub fn from_usage(usage: TokenUsage, rates: &CostRates) -> Self {
        Self {
            prompt_tokens: usage.input_tokens,
            completion_tokens: usage.output_tokens,
            total_tokens: usage.total(),
            estimated_cost_usd: rates.cost(usage.input_tokens as f64, usage.output_tokens as f64),
        }
    }
}

/// Metrics attached to every successful analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetrics {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: u64,
    pub token_usage: TokenCost,
    pub review_count: usize,
    /// Rounded total tokens per analyzed review
    pub tokens_per_review: u32,
}

impl AnalysisMetrics {
    /// Build metrics for a call that started at `start_time` and took `elapsed`
    pub fn record(
        start_time: DateTime<Utc>,
        elapsed: Duration,
        usage: TokenUsage,
        review_count: usize,
        rates: &CostRates,
    ) -> Self {
        let end_time = start_time
            + chrono::Duration::from_std(elapsed).unwrap_or_else(|_| chrono::Duration::zero());
        let token_usage = TokenCost::from_usage(usage, rates);

        let tokens_per_review = if review_count == 0 {
            0
        } else {
            (token_usage.total_tokens as f64 / review_count as f64).round() as u32
        };

        Self {
            start_time,
            end_time,
            duration_ms: elapsed.as_millis() as u64,
            token_usage,
            review_count,
            tokens_per_review,
        }
    }

    /// Format metrics for display
    pub fn display(&self) -> String {
        format!(
            "Duration: {:.1}s\n\
             Reviews: {}\n\
             Tokens: {} (prompt: {}, completion: {})\n\
             Tokens/Review: {}\n\
             Estimated Cost: ${:.4}",
            self.duration_ms as f64 / 1000.0,
            self.review_count,
            self.token_usage.total_tokens,
            self.token_usage.prompt_tokens,
            self.token_usage.completion_tokens,
            self.tokens_per_review,
            self.token_usage.estimated_cost_usd
        )
    }
}

// =============================================================================
// Pre-flight Estimation
// =============================================================================

/// Predicted token and cost range for an analysis that has not run yet
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCostEstimate {
    pub min_tokens: u32,
    pub max_tokens: u32,
    pub min_cost_usd: f64,
    pub max_cost_usd: f64,
}

impl TokenCostEstimate {
    pub fn display(&self) -> String {
        format!(
            "Tokens: {} - {}\nEstimated Cost: ${:.4} - ${:.4}",
            self.min_tokens, self.max_tokens, self.min_cost_usd, self.max_cost_usd
        )
    }
}

/// Pure estimator; never touches the network
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostEstimator {
    avg_tokens_per_review: u32,
    prompt_overhead_tokens: u32,
    response_tokens: u32,
    band: f64,
    rates: CostRates,
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self::from_config(&PricingConfig::default())
    }
}

impl CostEstimator {
    pub fn from_config(config: &PricingConfig) -> Self {
        Self {
            avg_tokens_per_review: config.avg_tokens_per_review,
            prompt_overhead_tokens: config.prompt_overhead_tokens,
            response_tokens: config.response_tokens,
            band: config.estimate_band,
            rates: CostRates::from_config(config),
        }
    }

    pub fn with_rates(mut self, rates: CostRates) -> Self {
        self.rates = rates;
        self
    }

    pub fn estimate(&self, review_count: usize) -> TokenCostEstimate {
        let prompt = self.prompt_overhead_tokens as f64
            + review_count as f64 * self.avg_tokens_per_review as f64;
        let completion = self.response_tokens as f64;
        let total = prompt + completion;

        let low = 1.0 - self.band;
        let high = 1.0 + self.band;

        TokenCostEstimate {
            // float-to-int casts saturate
            min_tokens: (total * low).round() as u32,
            max_tokens: (total * high).round() as u32,
            min_cost_usd: self.rates.cost(prompt * low, completion * low),
            max_cost_usd: self.rates.cost(prompt * high, completion * high),
        }
    }
}

/// Pre-flight estimate with the default constants and rates
pub fn estimate_token_cost(review_count: usize) -> TokenCostEstimate {
    CostEstimator::default().estimate(review_count)
}
