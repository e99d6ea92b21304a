//! Caller-side Retry
//!
//! The analyzer never retries on its own. Callers that want retries wrap
//! `analyze` here: exponential backoff with jitter, retrying only the
//! retryable kinds (timeout, rate limit, malformed or schema-invalid output).
//! A rate-limit response never waits less than the provider asked for.

use backon::{ExponentialBuilder, Retryable};
use std::time::Duration;
use tracing::warn;

use super::pipeline::{AnalysisOutcome, SentimentAnalyzer};
use crate::constants::retry::{BACKOFF_FACTOR, BASE_DELAY_MS, DEFAULT_MAX_RETRIES, MAX_DELAY_SECS};
use crate::types::{AnalysisRequest, ErrorKind, Result, SentimentError};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub factor: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(BASE_DELAY_MS),
            max_delay: Duration::from_secs(MAX_DELAY_SECS),
            factor: BACKOFF_FACTOR,
        }
    }
}

impl RetryPolicy {
    /// Single attempt
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_max_delay(self.max_delay)
            .with_factor(self.factor)
            .with_max_times(self.max_retries)
            .with_jitter()
    }
}

/// Run `analyze`, retrying retryable failures per `policy`
pub async fn analyze_with_retry(
    analyzer: &SentimentAnalyzer,
    request: &AnalysisRequest,
    policy: &RetryPolicy,
) -> Result<AnalysisOutcome> {
    (|| analyzer.analyze(request))
        .retry(policy.backoff())
        .when(SentimentError::is_retryable)
        .adjust(|err: &SentimentError, delay: Option<Duration>| match err.kind() {
            ErrorKind::RateLimited => delay.map(|d| d.max(err.recommended_delay())),
            _ => delay,
        })
        .notify(|err: &SentimentError, delay: Duration| {
            warn!(
                kind = %err.kind(),
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Retrying sentiment analysis"
            );
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::ModelParams;
    use crate::ai::provider::stub::StubProvider;
    use crate::ai::validation::fixtures::valid_response;
    use crate::types::ReviewForAnalysis;
    use chrono::Utc;
    use std::sync::Arc;

    fn request(n: usize) -> AnalysisRequest {
        let reviews = (0..n)
            .map(|i| ReviewForAnalysis::new(format!("r{}", i), "Good coffee", 4, Utc::now()))
            .collect();
        AnalysisRequest::new(reviews, "Corner Cafe", n)
    }

    fn fast_policy(max_retries: usize) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_retries(max_retries)
            .with_base_delay(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_malformed_output_is_retried_until_valid() {
        let stub = Arc::new(
            StubProvider::new()
                .respond_with("not json at all")
                .respond_with(valid_response((18, 0, 0)).to_string()),
        );
        let analyzer = SentimentAnalyzer::new(stub.clone(), ModelParams::default());

        let outcome = analyze_with_retry(&analyzer, &request(18), &fast_policy(2))
            .await
            .unwrap();

        assert_eq!(stub.calls(), 2);
        assert_eq!(outcome.result.sentiment_summary.breakdown.total_count(), 18);
    }

    #[tokio::test]
    async fn test_schema_failures_exhaust_retries() {
        let stub = Arc::new(
            StubProvider::new()
                .respond_with(valid_response((7, 5, 5)).to_string())
                .respond_with(valid_response((7, 5, 5)).to_string())
                .respond_with(valid_response((7, 5, 5)).to_string()),
        );
        let analyzer = SentimentAnalyzer::new(stub.clone(), ModelParams::default());

        let err = analyze_with_retry(&analyzer, &request(18), &fast_policy(2))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::SchemaValidationFailed);
        assert_eq!(stub.calls(), 3);
    }

    #[tokio::test]
    async fn test_preconditions_are_not_retried() {
        let stub = Arc::new(StubProvider::new());
        let analyzer = SentimentAnalyzer::new(stub.clone(), ModelParams::default());

        let err = analyze_with_retry(&analyzer, &request(3), &fast_policy(5))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InsufficientReviews);
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_failures_are_not_retried() {
        let stub = Arc::new(
            StubProvider::new()
                .fail_with(SentimentError::unknown("HTTP 500"))
                .respond_with(valid_response((18, 0, 0)).to_string()),
        );
        let analyzer = SentimentAnalyzer::new(stub.clone(), ModelParams::default());

        let err = analyze_with_retry(&analyzer, &request(18), &fast_policy(3))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnknownFailure);
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn test_no_retry_policy_makes_one_attempt() {
        let stub = Arc::new(StubProvider::new().respond_with("{"));
        let analyzer = SentimentAnalyzer::new(stub.clone(), ModelParams::default());

        let err = analyze_with_retry(&analyzer, &request(18), &RetryPolicy::none())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MalformedOutput);
        assert_eq!(stub.calls(), 1);
    }
}
