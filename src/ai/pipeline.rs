//! Sentiment Analysis Pipeline
//!
//! One call per analysis:
//! preconditions → compress → prompt → model call (bounded by timeout)
//! → validate → metrics.
//!
//! The analyzer holds only immutable configuration and a shared provider,
//! so analyses for different businesses can run concurrently on one instance.
//! Failures are logged once with structured context and returned typed;
//! nothing is retried here (see `ai::retry`).

use chrono::Utc;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::compressor::compress_reviews;
use super::metrics::{AnalysisMetrics, CostRates};
use super::prompt::build_sentiment_prompt;
use super::provider::{ModelParams, SharedProvider, TokenUsage, create_provider};
use super::timeout::with_timeout;
use super::tokenizer::TokenCounter;
use super::validation::{ValidationContext, validate_response};
use crate::config::Config;
use crate::constants::analysis::MIN_REVIEWS;
use crate::types::{AnalysisRequest, Result, SentimentAnalysisResult, SentimentError};

/// Validated result plus the metrics of the call that produced it
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub result: SentimentAnalysisResult,
    pub metrics: AnalysisMetrics,
}

pub struct SentimentAnalyzer {
    provider: SharedProvider,
    params: ModelParams,
    rates: CostRates,
    min_reviews: usize,
    counter: TokenCounter,
}

impl std::fmt::Debug for SentimentAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentAnalyzer")
            .field("provider", &self.provider.name())
            .field("params", &self.params)
            .field("rates", &self.rates)
            .field("min_reviews", &self.min_reviews)
            .finish()
    }
}

impl SentimentAnalyzer {
    pub fn new(provider: SharedProvider, params: ModelParams) -> Self {
        Self {
            provider,
            params,
            rates: CostRates::default(),
            min_reviews: MIN_REVIEWS,
            counter: TokenCounter::default(),
        }
    }

    /// Build the configured provider and analyzer
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = create_provider(&config.llm)?;
        Ok(Self::with_provider(provider, config))
    }

    /// Analyzer over an existing provider, parameters taken from `config`
    pub fn with_provider(provider: SharedProvider, config: &Config) -> Self {
        Self::new(provider, ModelParams::from_config(&config.llm))
            .with_rates(CostRates::from_config(&config.pricing))
            .with_min_reviews(config.analysis.min_reviews)
    }

    pub fn with_rates(mut self, rates: CostRates) -> Self {
        self.rates = rates;
        self
    }

    /// Raise the review minimum; values below `MIN_REVIEWS` are clamped up
    pub fn with_min_reviews(mut self, min_reviews: usize) -> Self {
        self.min_reviews = min_reviews.max(MIN_REVIEWS);
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    /// Local checks run before any network call, in fixed order
    pub fn check_preconditions(&self, request: &AnalysisRequest) -> Result<()> {
        let provided = request.reviews.len();
        if provided < self.min_reviews {
            return Err(SentimentError::InsufficientReviews {
                provided,
                required: self.min_reviews,
            });
        }
        if request.business_name.trim().is_empty() {
            return Err(SentimentError::MissingBusinessName);
        }
        if request.reviews.is_empty() {
            return Err(SentimentError::NoReviewsProvided);
        }
        if !self.provider.is_configured() {
            return Err(SentimentError::config(format!(
                "No API credential configured for provider '{}'",
                self.provider.name()
            )));
        }
        Ok(())
    }

    /// Run one analysis
    #[instrument(
        skip(self, request),
        fields(
            analysis_id = %Uuid::new_v4(),
            business = %request.business_name,
            review_count = request.reviews.len(),
        )
    )]
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome> {
        let started = Instant::now();

        match self.run(request, started).await {
            Ok(outcome) => {
                info!(
                    duration_ms = outcome.metrics.duration_ms,
                    total_tokens = outcome.metrics.token_usage.total_tokens,
                    cost_usd = outcome.metrics.token_usage.estimated_cost_usd,
                    label = %outcome.result.sentiment_summary.overall_label,
                    "Sentiment analysis completed"
                );
                Ok(outcome)
            }
            Err(err) => {
                report_failure(&err, request.reviews.len(), started.elapsed());
                Err(err)
            }
        }
    }

    async fn run(&self, request: &AnalysisRequest, started: Instant) -> Result<AnalysisOutcome> {
        let start_time = Utc::now();
        self.check_preconditions(request)?;

        let review_count = request.reviews.len();
        let params = self.resolve_params(request)?;

        let total_in_account = if request.total_reviews_in_account < review_count {
            warn!(
                total_reviews_in_account = request.total_reviews_in_account,
                review_count, "Account total is below the analyzed count; using the analyzed count"
            );
            review_count
        } else {
            request.total_reviews_in_account
        };

        let compressed = compress_reviews(&request.reviews);
        let prompt =
            build_sentiment_prompt(&compressed, request.business_name.trim(), total_in_account)?;

        debug!(
            provider = self.provider.name(),
            model = %params.model,
            prompt_tokens = self.counter.count_all([prompt.system.as_str(), prompt.user.as_str()]),
            "Requesting sentiment analysis"
        );

        let response = with_timeout(
            params.timeout,
            self.provider.generate(&prompt, &params),
            "sentiment analysis request",
        )
        .await?;

        debug!(
            provider = %response.metadata.provider,
            model = %response.metadata.model,
            latency_ms = response.timing.total_ms,
            response_chars = response.content.len(),
            "Model responded"
        );

        let ctx = ValidationContext::new(review_count)
            .with_review_ids(request.reviews.iter().map(|r| r.id.as_str()));
        let result = validate_response(&response.content, &ctx)?.into_result()?;

        let usage = response.usage.unwrap_or_else(|| {
            debug!("Provider reported no token usage; estimating from text");
            TokenUsage::new(
                self.counter
                    .count_all([prompt.system.as_str(), prompt.user.as_str()]),
                self.counter.count(&response.content),
            )
        });

        let metrics =
            AnalysisMetrics::record(start_time, started.elapsed(), usage, review_count, &self.rates);

        Ok(AnalysisOutcome { result, metrics })
    }

    fn resolve_params(&self, request: &AnalysisRequest) -> Result<ModelParams> {
        let params = match &request.overrides {
            Some(overrides) => self.params.clone().with_overrides(overrides),
            None => self.params.clone(),
        };

        if params.model.trim().is_empty() {
            return Err(SentimentError::config("Model name must not be empty"));
        }
        if !(0.0..=2.0).contains(&params.temperature) {
            return Err(SentimentError::config(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                params.temperature
            )));
        }
        if params.max_tokens == 0 {
            return Err(SentimentError::config("max_tokens must be greater than 0"));
        }
        if params.timeout.is_zero() {
            return Err(SentimentError::config("Timeout must be greater than 0"));
        }

        Ok(params)
    }
}

/// Single structured report per failed analysis
fn report_failure(err: &SentimentError, review_count: usize, elapsed: Duration) {
    let kind = err.kind();
    let duration_ms = elapsed.as_millis() as u64;

    match err {
        SentimentError::SchemaValidation { errors } => {
            let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
            warn!(
                %kind,
                review_count,
                duration_ms,
                error_count = errors.len(),
                errors = ?details,
                "Model output failed schema validation"
            );
        }
        SentimentError::MalformedOutput { message, preview } => {
            warn!(
                %kind,
                review_count,
                duration_ms,
                %message,
                %preview,
                "Model output was not valid JSON"
            );
        }
        _ if kind.is_precondition() => {
            warn!(%kind, review_count, duration_ms, error = %err, "Analysis request rejected");
        }
        _ => {
            error!(%kind, review_count, duration_ms, error = %err, "Sentiment analysis failed");
        }
    }
}
