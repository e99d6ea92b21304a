//! Estimate Command
//!
//! Pre-flight token and cost band for a review count. No network access.

use crate::ai::CostEstimator;
use crate::cli::OutputFormat;
use crate::cli::ui::Output;
use crate::config::Config;
use crate::types::Result;

pub fn run(config: &Config, review_count: usize, format: OutputFormat) -> Result<()> {
    let estimate = CostEstimator::from_config(&config.pricing).estimate(review_count);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&estimate)?),
        OutputFormat::Text => {
            let output = Output::new();
            output.estimate(review_count, &estimate);
            if review_count < config.analysis.min_reviews {
                output.warning(&format!(
                    "An analysis needs at least {} reviews",
                    config.analysis.min_reviews
                ));
            }
        }
    }

    Ok(())
}
