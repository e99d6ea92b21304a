//! Validate Command
//!
//! Check saved model output offline, printing every violation.
//!
//! Usage:
//!   reviewlens validate --input response.json --review-count 18
//!   reviewlens validate --input response.json --reviews reviews.json

use serde_json::json;
use std::path::Path;

use crate::ai::{ValidationContext, ValidationOutcome, validate_response};
use crate::cli::ui::Output;
use crate::cli::{OutputFormat, read_reviews};
use crate::types::{Result, SentimentError};

/// Returns whether the output was accepted
pub fn run(
    input: &Path,
    review_count: Option<usize>,
    reviews_path: Option<&Path>,
    format: OutputFormat,
) -> Result<bool> {
    let raw = std::fs::read_to_string(input)?;
    let reviews = reviews_path.map(read_reviews).transpose()?;

    let expected = match (review_count, &reviews) {
        (Some(count), _) => count,
        (None, Some(reviews)) => reviews.len(),
        (None, None) => {
            return Err(SentimentError::config(
                "Either --review-count or --reviews is required",
            ));
        }
    };

    let mut ctx = ValidationContext::new(expected);
    if let Some(reviews) = &reviews {
        ctx = ctx.with_review_ids(reviews.iter().map(|r| r.id.as_str()));
    }

    let outcome = validate_response(&raw, &ctx)?;
    let accepted = outcome.is_valid();

    match format {
        OutputFormat::Json => {
            let report = match &outcome {
                ValidationOutcome::Valid(result) => json!({ "valid": true, "result": result }),
                ValidationOutcome::Invalid(errors) => json!({ "valid": false, "errors": errors }),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            let output = Output::new();
            match &outcome {
                ValidationOutcome::Valid(result) => {
                    output.success(&format!(
                        "Output is valid ({} themes, {} improvement ideas)",
                        result.themes.len(),
                        result.improvement_ideas.len()
                    ));
                }
                ValidationOutcome::Invalid(errors) => {
                    output.error("Output failed validation");
                    output.validation_errors(errors);
                }
            }
        }
    }

    Ok(accepted)
}
