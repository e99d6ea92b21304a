//! Analyze Command
//!
//! Run one sentiment analysis over a JSON file of reviews.
//!
//! Usage:
//!   reviewlens analyze --input reviews.json --business "Blue Door Bakery"
//!   reviewlens analyze -i reviews.json -b Shop --retries 2 --format json

use std::path::PathBuf;
use tracing::info;

use crate::ai::{RetryPolicy, SentimentAnalyzer, analyze_with_retry};
use crate::cli::ui::Output;
use crate::cli::{OutputFormat, read_reviews};
use crate::config::Config;
use crate::types::{AnalysisRequest, ModelOverrides, Result};

pub struct AnalyzeOptions {
    pub input: PathBuf,
    pub business: String,
    pub total: Option<usize>,
    pub overrides: ModelOverrides,
    pub retries: usize,
    pub format: OutputFormat,
}

pub async fn run(config: &Config, options: AnalyzeOptions) -> Result<()> {
    let output = Output::new();
    let reviews = read_reviews(&options.input)?;
    let total = options.total.unwrap_or(reviews.len());

    info!(
        input = %options.input.display(),
        reviews = reviews.len(),
        "Loaded reviews"
    );

    let mut request = AnalysisRequest::new(reviews, options.business.clone(), total);
    if !options.overrides.is_empty() {
        request = request.with_overrides(options.overrides);
    }

    let analyzer = SentimentAnalyzer::from_config(config)?;
    let policy = if options.retries == 0 {
        RetryPolicy::none()
    } else {
        RetryPolicy::default().with_max_retries(options.retries)
    };

    let outcome = match analyze_with_retry(&analyzer, &request, &policy).await {
        Ok(outcome) => outcome,
        Err(err) => {
            output.failure(&err);
            return Err(err);
        }
    };

    match options.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        OutputFormat::Text => {
            output.analysis(&options.business, &outcome.result);
            output.metrics(&outcome.metrics);
        }
    }

    Ok(())
}
