//! Sentiment analysis prompt template
//!
//! One fixed template per invocation. The output schema is embedded as a
//! literal description; JSON-mode on the provider side only guarantees
//! parseable text, the validator guarantees the shape.

use super::{PromptBuilder, RenderedPrompt};
use crate::constants::schema::{
    MAX_EXCERPT_CHARS, MAX_IMPROVEMENT_IDEAS, MAX_QUOTES_PER_THEME, MAX_THEMES,
    MIN_QUOTES_PER_THEME,
};
use crate::types::{CompressedReview, Result};

pub const SYSTEM_PROMPT: &str = "You are an evidence-grounded customer insights analyst. \
You only make claims that are directly supported by the reviews you are given. \
You never fabricate quotes, statistics, or themes. When the data is too thin to support a \
conclusion, you say so in the limitations field instead of guessing. \
You always respond with a single valid JSON object and nothing else.";

const CLOSING_REMINDER: &str =
    "Return the JSON object only: no markdown fences, no commentary before or after it.";

/// Literal JSON shape the model must emit
pub fn output_schema_description() -> String {
    format!(
        r#"{{
  "sentimentSummary": {{
    "overallLabel": "positive" | "mixed" | "negative",
    "sentimentScore": <integer 0-100>,
    "breakdown": {{
      "positive": {{ "count": <integer>, "percentage": <number> }},
      "mixed": {{ "count": <integer>, "percentage": <number> }},
      "negative": {{ "count": <integer>, "percentage": <number> }}
    }},
    "shortSummary": "<one sentence>"
  }},
  "themes": [
    {{
      "name": "<short theme name>",
      "sentiment": "strength" | "improvement",
      "mentionCount": <integer>,
      "supportingQuotes": [
        {{ "reviewId": "<id of a review above>", "excerpt": "<verbatim, at most {excerpt} characters>" }}
      ]
    }}
  ],
  "improvementIdeas": [
    {{
      "title": "<short title>",
      "description": "<one or two sentences>",
      "sourceThemes": ["<exact name of a theme above>"]
    }}
  ],
  "limitations": "<optional: why the data could not support more themes or ideas>"
}}"#,
        excerpt = MAX_EXCERPT_CHARS
    )
}

/// Render the system instruction and user prompt for one analysis.
///
/// Reviews are serialized compactly; `total_reviews_in_account` only affects
/// the disclosure line.
pub fn build_sentiment_prompt(
    reviews: &[CompressedReview],
    business_name: &str,
    total_reviews_in_account: usize,
) -> Result<RenderedPrompt> {
    let review_count = reviews.len();
    let reviews_json = serde_json::to_string(reviews)?;

    let disclosure = format!(
        "Business: {}\nYou are analyzing {} of the {} reviews this business has received.",
        business_name, review_count, total_reviews_in_account
    );

    let sentiment_task = format!(
        "Sentiment summary: classify every review as positive, mixed, or negative. \
         The three counts MUST add up to exactly {} and the percentages to 100.",
        review_count
    );
    let themes_task = format!(
        "Themes spotlight: identify up to {} recurring themes, each a strength or an improvement \
         area, with {} to {} short verbatim supporting quotes.",
        MAX_THEMES, MIN_QUOTES_PER_THEME, MAX_QUOTES_PER_THEME
    );
    let ideas_task = format!(
        "Improvement ideas: suggest up to {} concrete ideas, each referencing one or more of \
         your theme names exactly.",
        MAX_IMPROVEMENT_IDEAS
    );

    let user = PromptBuilder::new()
        .role("customer insights analyst", "small-business review analysis")
        .section("Context", &disclosure)
        .objectives(vec![
            sentiment_task.as_str(),
            themes_task.as_str(),
            ideas_task.as_str(),
            "Limitations: if the reviews do not support confident themes or ideas, explain why \
             in `limitations` rather than inventing them.",
        ])
        .focus(
            "the reviews listed below",
            vec![
                "Do NOT quote text that does not appear in a review",
                "Do NOT reference review ids that are not listed",
                "Do NOT mention competitors, prices, or facts absent from the reviews",
            ],
        )
        .anti_patterns(
            vec!["\"Customers love the 24/7 support\" when no review mentions support hours"],
            vec!["\"Several reviewers praise fast delivery\" backed by quotes from those reviews"],
        )
        .section("Reviews", &reviews_json)
        .section(
            "Output Format",
            "Respond ONLY with a JSON object of exactly this shape:",
        )
        .code("json", &output_schema_description())
        .text(CLOSING_REMINDER)
        .build();

    Ok(RenderedPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    })
}
