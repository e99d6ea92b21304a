//! Model Output Validation
//!
//! Two phases:
//! 1. Parse the raw text as JSON. Unparseable text is `MalformedOutput`.
//! 2. Walk the parsed value into a typed result, accumulating every
//!    violation as a flat `ValidationError`.
//!
//! ## Design Philosophy
//! - Never repair: a response is accepted as-is or rejected
//! - Report all violations at once so a retry prompt or log line is complete

mod response;

pub use response::{SentimentValidator, ValidationContext, ValidationOutcome};

use serde_json::Value;

use crate::constants::schema::MALFORMED_PREVIEW_CHARS;
use crate::types::{Result, SentimentError};

/// Parse raw model text into JSON without any cleanup
pub fn parse_model_output(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).map_err(|e| SentimentError::MalformedOutput {
        message: e.to_string(),
        preview: raw.chars().take(MALFORMED_PREVIEW_CHARS).collect(),
    })
}

/// Parse and validate raw model text.
///
/// `Err` only for unparseable text; schema violations come back as
/// `ValidationOutcome::Invalid`.
pub fn validate_response(raw: &str, ctx: &ValidationContext<'_>) -> Result<ValidationOutcome> {
    let value = parse_model_output(raw)?;
    Ok(SentimentValidator::new().validate_value(&value, ctx))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{Value, json};

    /// A well-formed response whose breakdown matches `counts` and whose
    /// quotes reference reviews `r0` and `r1`
    pub(crate) fn valid_response(counts: (u32, u32, u32)) -> Value {
        let (positive, mixed, negative) = counts;
        let total = (positive + mixed + negative).max(1) as f64;
        let pct = |count: u32| (count as f64 * 1000.0 / total).round() / 10.0;

        json!({
            "sentimentSummary": {
                "overallLabel": "positive",
                "sentimentScore": 72,
                "breakdown": {
                    "positive": {"count": positive, "percentage": pct(positive)},
                    "mixed": {"count": mixed, "percentage": pct(mixed)},
                    "negative": {"count": negative, "percentage": pct(negative)}
                },
                "shortSummary": "Guests love the pastries but find weekend waits long."
            },
            "themes": [
                {
                    "name": "Pastry quality",
                    "sentiment": "strength",
                    "mentionCount": 9,
                    "supportingQuotes": [
                        {"reviewId": "r0", "excerpt": "best croissant in town"}
                    ]
                },
                {
                    "name": "Weekend wait times",
                    "sentiment": "improvement",
                    "mentionCount": 5,
                    "supportingQuotes": [
                        {"reviewId": "r1", "excerpt": "waited 25 minutes on Saturday"},
                        {"reviewId": "r0", "excerpt": "line out the door"}
                    ]
                }
            ],
            "improvementIdeas": [
                {
                    "title": "Add a weekend pre-order window",
                    "description": "Let regulars order ahead online to shorten the Saturday line.",
                    "sourceThemes": ["Weekend wait times"]
                }
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::valid_response;
    use super::*;
    use crate::types::{ErrorKind, OverallLabel, ThemeSentiment, ValidationErrorKind};
    use proptest::prelude::*;
    use serde_json::json;

    fn ids() -> Vec<String> {
        (0..18).map(|i| format!("r{}", i)).collect()
    }

    fn check(value: &Value) -> ValidationOutcome {
        let ids = ids();
        let ctx = ValidationContext::new(18).with_review_ids(ids.iter().map(String::as_str));
        SentimentValidator::new().validate_value(value, &ctx)
    }

    fn fields(outcome: &ValidationOutcome) -> Vec<&str> {
        outcome.errors().iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_valid_response_is_accepted() {
        let outcome = check(&valid_response((8, 5, 5)));
        assert!(outcome.is_valid(), "unexpected errors: {:?}", outcome.errors());

        let result = outcome.into_result().unwrap();
        let summary = &result.sentiment_summary;
        assert_eq!(summary.overall_label, OverallLabel::Positive);
        assert_eq!(summary.sentiment_score, 72);
        assert_eq!(summary.breakdown.total_count(), 18);
        assert_eq!(result.themes.len(), 2);
        assert_eq!(
            result.theme("Weekend wait times").unwrap().sentiment,
            ThemeSentiment::Improvement
        );
        assert_eq!(result.improvement_ideas[0].source_themes, ["Weekend wait times"]);
        assert!(result.limitations.is_none());
    }

    #[test]
    fn test_accepted_result_serializes_back_to_same_shape() {
        let input = valid_response((8, 5, 5));
        let result = check(&input).into_result().unwrap();
        let output = serde_json::to_value(&result).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_malformed_text_is_malformed_output() {
        let err = validate_response("Sure! Here is your analysis:", &ValidationContext::new(18))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedOutput);
    }

    #[test]
    fn test_malformed_preview_is_truncated() {
        let raw = format!("{{\"sentimentSummary\": {}", "x".repeat(500));
        match parse_model_output(&raw).unwrap_err() {
            SentimentError::MalformedOutput { preview, .. } => {
                assert_eq!(preview.chars().count(), 200);
                assert!(raw.starts_with(&preview));
            }
            other => panic!("expected MalformedOutput, got {:?}", other),
        }
    }

    #[test]
    fn test_code_fenced_json_is_not_repaired() {
        let raw = format!("```json\n{}\n```", valid_response((8, 5, 5)));
        let err = validate_response(&raw, &ValidationContext::new(18)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedOutput);
    }

    #[test]
    fn test_non_object_root_rejected() {
        let outcome = check(&json!([1, 2, 3]));
        assert_eq!(fields(&outcome), ["$"]);
        assert_eq!(outcome.errors()[0].kind, ValidationErrorKind::InvalidType);
    }

    #[test]
    fn test_missing_summary_reported_by_path() {
        let mut value = valid_response((8, 5, 5));
        value.as_object_mut().unwrap().remove("sentimentSummary");

        let outcome = check(&value);
        assert_eq!(fields(&outcome), ["sentimentSummary"]);
        assert_eq!(outcome.errors()[0].kind, ValidationErrorKind::MissingField);
    }

    #[test]
    fn test_null_summary_counts_as_missing() {
        let mut value = valid_response((8, 5, 5));
        value["sentimentSummary"] = Value::Null;

        let outcome = check(&value);
        assert_eq!(outcome.errors()[0].kind, ValidationErrorKind::MissingField);
    }

    #[test]
    fn test_breakdown_count_mismatch_reports_expected_and_received() {
        // 7 + 5 + 5 = 17 against 18 analyzed reviews
        let outcome = check(&valid_response((7, 5, 5)));
        let err = outcome
            .errors()
            .iter()
            .find(|e| e.kind == ValidationErrorKind::Consistency)
            .expect("count mismatch not reported");

        assert_eq!(err.field, "sentimentSummary.breakdown");
        assert_eq!(err.expected.as_deref(), Some("18"));
        assert_eq!(err.received.as_deref(), Some("17"));
    }

    #[test]
    fn test_blank_short_summary_rejected() {
        let mut value = valid_response((8, 5, 5));
        value["sentimentSummary"]["shortSummary"] = json!("  ");

        let outcome = check(&value);
        assert_eq!(fields(&outcome), ["sentimentSummary.shortSummary"]);
        let err = &outcome.errors()[0];
        assert_eq!(err.kind, ValidationErrorKind::InvalidValue);
        assert_eq!(err.expected.as_deref(), Some("non-empty string"));
        assert_eq!(err.received, None);
    }

    #[test]
    fn test_percentages_within_tolerance_accepted() {
        for (p, m, n) in [(33.0, 33.0, 33.0), (34.0, 34.0, 33.0), (33.3, 33.3, 33.4)] {
            let mut value = valid_response((8, 5, 5));
            value["sentimentSummary"]["breakdown"]["positive"]["percentage"] = json!(p);
            value["sentimentSummary"]["breakdown"]["mixed"]["percentage"] = json!(m);
            value["sentimentSummary"]["breakdown"]["negative"]["percentage"] = json!(n);
            assert!(check(&value).is_valid(), "{} + {} + {} rejected", p, m, n);
        }
    }

    #[test]
    fn test_percentages_outside_tolerance_rejected() {
        let mut value = valid_response((8, 5, 5));
        value["sentimentSummary"]["breakdown"]["positive"]["percentage"] = json!(40.0);

        let outcome = check(&value);
        assert_eq!(fields(&outcome), ["sentimentSummary.breakdown"]);
        assert_eq!(outcome.errors()[0].kind, ValidationErrorKind::Consistency);
    }

    #[test]
    fn test_unknown_overall_label_rejected() {
        let mut value = valid_response((8, 5, 5));
        value["sentimentSummary"]["overallLabel"] = json!("ecstatic");

        let outcome = check(&value);
        let err = &outcome.errors()[0];
        assert_eq!(err.field, "sentimentSummary.overallLabel");
        assert_eq!(err.kind, ValidationErrorKind::InvalidValue);
        assert_eq!(err.received.as_deref(), Some("\"ecstatic\""));
    }

    #[test]
    fn test_sentiment_score_bounds() {
        for (score, ok) in [
            (json!(0), true),
            (json!(100), true),
            (json!(101), false),
            (json!(-1), false),
            (json!(72.5), false),
            (json!("72"), false),
        ] {
            let mut value = valid_response((8, 5, 5));
            value["sentimentSummary"]["sentimentScore"] = score.clone();
            let outcome = check(&value);
            assert_eq!(outcome.is_valid(), ok, "score {}", score);
            if !ok {
                assert_eq!(fields(&outcome), ["sentimentSummary.sentimentScore"]);
            }
        }
    }

    #[test]
    fn test_too_many_themes_rejected() {
        let mut value = valid_response((8, 5, 5));
        let theme = value["themes"][0].clone();
        let themes = value["themes"].as_array_mut().unwrap();
        for name in ["Staff", "Parking"] {
            let mut extra = theme.clone();
            extra["name"] = json!(name);
            themes.push(extra);
        }

        let outcome = check(&value);
        assert_eq!(fields(&outcome), ["themes"]);
        assert_eq!(outcome.errors()[0].kind, ValidationErrorKind::OutOfRange);
    }

    #[test]
    fn test_empty_themes_require_limitations() {
        let mut value = valid_response((8, 5, 5));
        value["themes"] = json!([]);
        value["improvementIdeas"] = json!([]);
        let outcome = check(&value);
        assert_eq!(fields(&outcome), ["themes"]);

        value["limitations"] = json!("Reviews are too short to identify recurring themes.");
        let result = check(&value).into_result().unwrap();
        assert!(result.themes.is_empty());
        assert!(result.limitations.is_some());
    }

    #[test]
    fn test_blank_limitations_do_not_excuse_empty_themes() {
        let mut value = valid_response((8, 5, 5));
        value["themes"] = json!([]);
        value["improvementIdeas"] = json!([]);
        value["limitations"] = json!("   ");
        assert!(!check(&value).is_valid());
    }

    #[test]
    fn test_quote_count_bounds() {
        let mut value = valid_response((8, 5, 5));
        value["themes"][0]["supportingQuotes"] = json!([]);
        let outcome = check(&value);
        assert_eq!(fields(&outcome), ["themes[0].supportingQuotes"]);

        let quote = json!({"reviewId": "r2", "excerpt": "lovely"});
        value["themes"][0]["supportingQuotes"] = json!([quote, quote, quote]);
        let outcome = check(&value);
        assert_eq!(fields(&outcome), ["themes[0].supportingQuotes"]);
    }

    #[test]
    fn test_excerpt_length_counts_characters() {
        let mut value = valid_response((8, 5, 5));
        value["themes"][0]["supportingQuotes"][0]["excerpt"] = json!("é".repeat(80));
        assert!(check(&value).is_valid());

        value["themes"][0]["supportingQuotes"][0]["excerpt"] = json!("a".repeat(81));
        let outcome = check(&value);
        let err = &outcome.errors()[0];
        assert_eq!(err.field, "themes[0].supportingQuotes[0].excerpt");
        assert_eq!(err.kind, ValidationErrorKind::OutOfRange);
        assert_eq!(err.received.as_deref(), Some("81 characters"));
    }

    #[test]
    fn test_quote_must_reference_analyzed_review() {
        let mut value = valid_response((8, 5, 5));
        value["themes"][1]["supportingQuotes"][0]["reviewId"] = json!("r999");

        let outcome = check(&value);
        let err = &outcome.errors()[0];
        assert_eq!(err.field, "themes[1].supportingQuotes[0].reviewId");
        assert_eq!(err.kind, ValidationErrorKind::Reference);
    }

    #[test]
    fn test_review_ids_unchecked_without_id_set() {
        let mut value = valid_response((8, 5, 5));
        value["themes"][1]["supportingQuotes"][0]["reviewId"] = json!("r999");

        let outcome = SentimentValidator::new().validate_value(&value, &ValidationContext::new(18));
        assert!(outcome.is_valid());
    }

    #[test]
    fn test_dangling_source_theme_rejected() {
        let mut value = valid_response((8, 5, 5));
        value["improvementIdeas"][0]["sourceThemes"] = json!(["Weekend wait times", "Parking"]);

        let outcome = check(&value);
        let err = &outcome.errors()[0];
        assert_eq!(err.field, "improvementIdeas[0].sourceThemes[1]");
        assert_eq!(err.kind, ValidationErrorKind::Reference);
        assert_eq!(err.received.as_deref(), Some("\"Parking\""));
        assert!(err.expected.as_deref().unwrap().contains("Pastry quality"));
    }

    #[test]
    fn test_idea_without_source_themes_rejected() {
        let mut value = valid_response((8, 5, 5));
        value["improvementIdeas"][0]["sourceThemes"] = json!([]);
        assert_eq!(fields(&check(&value)), ["improvementIdeas[0].sourceThemes"]);
    }

    #[test]
    fn test_too_many_ideas_rejected() {
        let mut value = valid_response((8, 5, 5));
        let idea = value["improvementIdeas"][0].clone();
        value["improvementIdeas"] = json!([idea, idea, idea, idea]);
        assert_eq!(fields(&check(&value)), ["improvementIdeas"]);
    }

    #[test]
    fn test_limitations_must_be_text() {
        let mut value = valid_response((8, 5, 5));
        value["limitations"] = json!(["thin data"]);
        let outcome = check(&value);
        assert_eq!(fields(&outcome), ["limitations"]);
        assert_eq!(outcome.errors()[0].kind, ValidationErrorKind::InvalidType);
    }

    #[test]
    fn test_all_violations_reported_together() {
        let mut value = valid_response((7, 5, 5));
        value["sentimentSummary"]["overallLabel"] = json!("great");
        value["themes"][0]["mentionCount"] = json!(-3);
        value["themes"][0]["supportingQuotes"][0]["excerpt"] = json!("b".repeat(120));
        value["improvementIdeas"][0].as_object_mut().unwrap().remove("title");

        let outcome = check(&value);
        let found = fields(&outcome);
        for expected in [
            "sentimentSummary.overallLabel",
            "sentimentSummary.breakdown",
            "themes[0].mentionCount",
            "themes[0].supportingQuotes[0].excerpt",
            "improvementIdeas[0].title",
        ] {
            assert!(found.contains(&expected), "{} missing from {:?}", expected, found);
        }
    }

    #[test]
    fn test_invalid_outcome_converts_to_schema_error() {
        let err = check(&valid_response((7, 5, 5))).into_result().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaValidationFailed);
        assert_eq!(err.validation_errors().len(), 1);
    }

    proptest! {
        #[test]
        fn prop_arbitrary_text_never_panics(raw in ".{0,400}") {
            let _ = validate_response(&raw, &ValidationContext::new(18));
        }

        #[test]
        fn prop_count_mismatch_always_rejected(
            positive in 0u32..40,
            mixed in 0u32..40,
            negative in 0u32..40,
        ) {
            prop_assume!(positive + mixed + negative != 18);
            let outcome = check(&valid_response((positive, mixed, negative)));
            let reported = outcome.errors().iter().any(|e| {
                e.field == "sentimentSummary.breakdown"
                    && e.kind == ValidationErrorKind::Consistency
                    && e.received == Some((positive + mixed + negative).to_string())
            });
            prop_assert!(reported);
        }
    }
}
