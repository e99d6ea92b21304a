//! Sentiment Response Validation
//!
//! Walks the loosely-typed JSON produced by the model and either builds a
//! typed `SentimentAnalysisResult` or reports every violation found:
//! - Required fields presence and JSON types
//! - Enum values (overall label, theme sentiment)
//! - Numeric ranges and list sizes
//! - Breakdown counts summing exactly to the review count
//! - Breakdown percentages summing to 100 within rounding tolerance
//! - Quote review ids and idea theme references resolving
//!
//! Violations accumulate; the walk never stops at the first one.

use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::constants::schema::{
    MAX_EXCERPT_CHARS, MAX_IMPROVEMENT_IDEAS, MAX_QUOTES_PER_THEME, MAX_SENTIMENT_SCORE,
    MAX_THEMES, MIN_QUOTES_PER_THEME, PERCENTAGE_TOLERANCE,
};
use crate::types::{
    BreakdownBucket, ImprovementIdea, OverallLabel, Result, SentimentAnalysisResult,
    SentimentBreakdown, SentimentError, SentimentSummary, SupportingQuote, Theme, ThemeSentiment,
    ValidationError, ValidationErrorKind,
};

type Object = Map<String, Value>;

/// Absorbs float noise in the percentage sum (33.3 + 33.3 + 33.4)
const FLOAT_EPSILON: f64 = 1e-9;

/// Longest value rendered into `received`
const RECEIVED_PREVIEW_CHARS: usize = 60;

/// Facts about the request the output is checked against
#[derive(Debug, Clone)]
pub struct ValidationContext<'a> {
    /// Number of reviews that were sent to the model
    pub expected_review_count: usize,
    review_ids: Option<HashSet<&'a str>>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(expected_review_count: usize) -> Self {
        Self {
            expected_review_count,
            review_ids: None,
        }
    }

    /// Restrict quote review ids to this set
    pub fn with_review_ids(mut self, ids: impl IntoIterator<Item = &'a str>) -> Self {
        self.review_ids = Some(ids.into_iter().collect());
        self
    }

    pub fn knows_review(&self, id: &str) -> bool {
        self.review_ids.as_ref().is_none_or(|ids| ids.contains(id))
    }
}

/// Accept/reject decision over one parsed response
#[derive(Debug, Clone)]
pub enum ValidationOutcome {
    Valid(SentimentAnalysisResult),
    Invalid(Vec<ValidationError>),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn errors(&self) -> &[ValidationError] {
        match self {
            Self::Valid(_) => &[],
            Self::Invalid(errors) => errors,
        }
    }

    /// Convert into the pipeline result, rejecting with the full error list
    pub fn into_result(self) -> Result<SentimentAnalysisResult> {
        match self {
            Self::Valid(result) => Ok(result),
            Self::Invalid(errors) => Err(SentimentError::SchemaValidation { errors }),
        }
    }
}

/// Stateless validator for sentiment analysis output
#[derive(Debug, Clone, Copy, Default)]
pub struct SentimentValidator;

impl SentimentValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate an already parsed response
    pub fn validate_value(&self, response: &Value, ctx: &ValidationContext<'_>) -> ValidationOutcome {
        let Some(root) = response.as_object() else {
            return ValidationOutcome::Invalid(vec![
                ValidationError::new(
                    ValidationErrorKind::InvalidType,
                    "$",
                    "Response must be a JSON object",
                )
                .with_comparison("object", type_name(response)),
            ]);
        };

        let mut walker = Walker {
            ctx,
            errors: Vec::new(),
        };

        let summary = walker.summary(root);
        let limitations = walker.limitations(root);
        let has_limitations = limitations
            .as_deref()
            .is_some_and(|text| !text.trim().is_empty());
        let themes = walker.themes(root, has_limitations);
        let theme_names = declared_theme_names(root);
        let ideas = walker.ideas(root, &theme_names);

        match (summary, themes, ideas) {
            (Some(sentiment_summary), Some(themes), Some(improvement_ideas))
                if walker.errors.is_empty() =>
            {
                ValidationOutcome::Valid(SentimentAnalysisResult {
                    sentiment_summary,
                    themes,
                    improvement_ideas,
                    limitations,
                })
            }
            _ => {
                debug_assert!(!walker.errors.is_empty());
                ValidationOutcome::Invalid(walker.errors)
            }
        }
    }
}

/// Names of every theme with a usable name, computed once per response
fn declared_theme_names(root: &Object) -> HashSet<&str> {
    root.get("themes")
        .and_then(Value::as_array)
        .map(|themes| {
            themes
                .iter()
                .filter_map(|t| t.get("name").and_then(Value::as_str))
                .filter(|name| !name.trim().is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn describe(value: &Value) -> String {
    let rendered = match value {
        Value::String(s) => format!("\"{}\"", s),
        other => other.to_string(),
    };
    if rendered.chars().count() > RECEIVED_PREVIEW_CHARS {
        let head: String = rendered.chars().take(RECEIVED_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        rendered
    }
}

// =============================================================================
// Walker
// =============================================================================

struct Walker<'c, 'a> {
    ctx: &'c ValidationContext<'a>,
    errors: Vec<ValidationError>,
}

impl Walker<'_, '_> {
    fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    fn invalid_type(&mut self, path: &str, expected: &str, value: &Value) {
        self.push(
            ValidationError::new(
                ValidationErrorKind::InvalidType,
                path,
                format!("'{}' must be {}", path, expected),
            )
            .with_comparison(expected, type_name(value)),
        );
    }

    /// Present, non-null field
    fn field<'v>(&mut self, obj: &'v Object, key: &str, path: &str) -> Option<&'v Value> {
        match obj.get(key) {
            None | Some(Value::Null) => {
                self.push(ValidationError::missing(path));
                None
            }
            Some(value) => Some(value),
        }
    }

    fn object<'v>(&mut self, obj: &'v Object, key: &str, path: &str) -> Option<&'v Object> {
        let value = self.field(obj, key, path)?;
        match value.as_object() {
            Some(inner) => Some(inner),
            None => {
                self.invalid_type(path, "an object", value);
                None
            }
        }
    }

    fn array<'v>(&mut self, obj: &'v Object, key: &str, path: &str) -> Option<&'v Vec<Value>> {
        let value = self.field(obj, key, path)?;
        match value.as_array() {
            Some(items) => Some(items),
            None => {
                self.invalid_type(path, "an array", value);
                None
            }
        }
    }

    fn element<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Object> {
        match value.as_object() {
            Some(obj) => Some(obj),
            None => {
                self.invalid_type(path, "an object", value);
                None
            }
        }
    }

    fn string(&mut self, obj: &Object, key: &str, path: &str) -> Option<String> {
        let value = self.field(obj, key, path)?;
        match value.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                self.invalid_type(path, "a string", value);
                None
            }
        }
    }

    fn non_empty_string(&mut self, obj: &Object, key: &str, path: &str) -> Option<String> {
        let s = self.string(obj, key, path)?;
        if s.trim().is_empty() {
            self.push(
                ValidationError::new(
                    ValidationErrorKind::InvalidValue,
                    path,
                    format!("'{}' must not be empty", path),
                )
                .expected("non-empty string"),
            );
            return None;
        }
        Some(s)
    }

    fn number(&mut self, obj: &Object, key: &str, path: &str) -> Option<f64> {
        let value = self.field(obj, key, path)?;
        match value.as_f64() {
            Some(n) => Some(n),
            None => {
                self.invalid_type(path, "a number", value);
                None
            }
        }
    }

    /// Non-negative integer that fits in u32
    fn count(&mut self, obj: &Object, key: &str, path: &str) -> Option<u32> {
        let value = self.field(obj, key, path)?;
        if !value.is_number() {
            self.invalid_type(path, "a non-negative integer", value);
            return None;
        }
        match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
            Some(n) => Some(n),
            None => {
                self.push(
                    ValidationError::new(
                        ValidationErrorKind::OutOfRange,
                        path,
                        format!("'{}' must be a non-negative integer", path),
                    )
                    .with_comparison("non-negative integer", describe(value)),
                );
                None
            }
        }
    }

    // -------------------------------------------------------------------------
    // sentimentSummary
    // -------------------------------------------------------------------------

    fn summary(&mut self, root: &Object) -> Option<SentimentSummary> {
        let obj = self.object(root, "sentimentSummary", "sentimentSummary")?;

        let overall_label = self.overall_label(obj);
        let sentiment_score = self.sentiment_score(obj);
        let breakdown = self.breakdown(obj);
        let short_summary =
            self.non_empty_string(obj, "shortSummary", "sentimentSummary.shortSummary");

        Some(SentimentSummary {
            overall_label: overall_label?,
            sentiment_score: sentiment_score?,
            breakdown: breakdown?,
            short_summary: short_summary?,
        })
    }

    fn overall_label(&mut self, obj: &Object) -> Option<OverallLabel> {
        let path = "sentimentSummary.overallLabel";
        let label = self.string(obj, "overallLabel", path)?;
        let parsed = OverallLabel::parse(&label);
        if parsed.is_none() {
            self.push(
                ValidationError::new(
                    ValidationErrorKind::InvalidValue,
                    path,
                    "Invalid overall label",
                )
                .with_comparison(OverallLabel::VALUES.join(" | "), format!("\"{}\"", label)),
            );
        }
        parsed
    }

    fn sentiment_score(&mut self, obj: &Object) -> Option<u8> {
        let path = "sentimentSummary.sentimentScore";
        let score = self.number(obj, "sentimentScore", path)?;

        if !(0.0..=MAX_SENTIMENT_SCORE as f64).contains(&score) {
            self.push(
                ValidationError::new(
                    ValidationErrorKind::OutOfRange,
                    path,
                    "Sentiment score must be between 0 and 100",
                )
                .with_comparison("0-100", score.to_string()),
            );
            return None;
        }

        if score.fract() != 0.0 {
            self.push(
                ValidationError::new(
                    ValidationErrorKind::InvalidValue,
                    path,
                    "Sentiment score must be an integer",
                )
                .with_comparison("integer 0-100", score.to_string()),
            );
            return None;
        }

        Some(score as u8)
    }

    fn breakdown(&mut self, summary: &Object) -> Option<SentimentBreakdown> {
        let path = "sentimentSummary.breakdown";
        let obj = self.object(summary, "breakdown", path)?;

        let positive = self.bucket(obj, "positive");
        let mixed = self.bucket(obj, "mixed");
        let negative = self.bucket(obj, "negative");

        if let (Some(p), Some(m), Some(n)) = (positive.0, mixed.0, negative.0) {
            let total = p as u64 + m as u64 + n as u64;
            let expected = self.ctx.expected_review_count as u64;
            if total != expected {
                self.push(
                    ValidationError::new(
                        ValidationErrorKind::Consistency,
                        path,
                        "Breakdown counts must sum to the number of analyzed reviews",
                    )
                    .with_comparison(expected.to_string(), total.to_string()),
                );
            }
        }

        if let (Some(p), Some(m), Some(n)) = (positive.1, mixed.1, negative.1) {
            let total = p + m + n;
            if (total - 100.0).abs() > PERCENTAGE_TOLERANCE + FLOAT_EPSILON {
                self.push(
                    ValidationError::new(
                        ValidationErrorKind::Consistency,
                        path,
                        "Breakdown percentages must sum to 100",
                    )
                    .with_comparison(
                        format!("100 ± {}", PERCENTAGE_TOLERANCE),
                        total.to_string(),
                    ),
                );
            }
        }

        let bucket = |(count, percentage): (Option<u32>, Option<f64>)| {
            Some(BreakdownBucket {
                count: count?,
                percentage: percentage?,
            })
        };

        Some(SentimentBreakdown {
            positive: bucket(positive)?,
            mixed: bucket(mixed)?,
            negative: bucket(negative)?,
        })
    }

    fn bucket(&mut self, breakdown: &Object, name: &str) -> (Option<u32>, Option<f64>) {
        let path = format!("sentimentSummary.breakdown.{}", name);
        let Some(obj) = self.object(breakdown, name, &path) else {
            return (None, None);
        };

        let count = self.count(obj, "count", &format!("{}.count", path));

        let percentage_path = format!("{}.percentage", path);
        let percentage = self
            .number(obj, "percentage", &percentage_path)
            .and_then(|pct| {
                if (0.0..=100.0).contains(&pct) {
                    Some(pct)
                } else {
                    self.push(
                        ValidationError::new(
                            ValidationErrorKind::OutOfRange,
                            percentage_path.as_str(),
                            "Percentage must be between 0 and 100",
                        )
                        .with_comparison("0-100", pct.to_string()),
                    );
                    None
                }
            });

        (count, percentage)
    }

    // -------------------------------------------------------------------------
    // limitations
    // -------------------------------------------------------------------------

    fn limitations(&mut self, root: &Object) -> Option<String> {
        match root.get("limitations") {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => {
                self.invalid_type("limitations", "a string", other);
                None
            }
        }
    }

    // -------------------------------------------------------------------------
    // themes
    // -------------------------------------------------------------------------

    fn themes(&mut self, root: &Object, has_limitations: bool) -> Option<Vec<Theme>> {
        let items = self.array(root, "themes", "themes")?;

        if items.is_empty() && !has_limitations {
            self.push(ValidationError::new(
                ValidationErrorKind::InvalidValue,
                "themes",
                "No themes identified; explain in 'limitations' when the reviews cannot support themes",
            ));
        }

        if items.len() > MAX_THEMES {
            self.push(
                ValidationError::new(
                    ValidationErrorKind::OutOfRange,
                    "themes",
                    format!("At most {} themes are allowed", MAX_THEMES),
                )
                .with_comparison(format!("at most {}", MAX_THEMES), items.len().to_string()),
            );
        }

        let mut themes = Vec::with_capacity(items.len());
        let mut all_valid = true;
        for (idx, item) in items.iter().enumerate() {
            match self.theme(item, idx) {
                Some(theme) => themes.push(theme),
                None => all_valid = false,
            }
        }

        all_valid.then_some(themes)
    }

    fn theme(&mut self, value: &Value, idx: usize) -> Option<Theme> {
        let path = format!("themes[{}]", idx);
        let obj = self.element(value, &path)?;

        let name = self.non_empty_string(obj, "name", &format!("{}.name", path));
        let sentiment = self.theme_sentiment(obj, &path);
        let mention_count = self.count(obj, "mentionCount", &format!("{}.mentionCount", path));
        let supporting_quotes = self.quotes(obj, &path);

        Some(Theme {
            name: name?,
            sentiment: sentiment?,
            mention_count: mention_count?,
            supporting_quotes: supporting_quotes?,
        })
    }

    fn theme_sentiment(&mut self, obj: &Object, theme_path: &str) -> Option<ThemeSentiment> {
        let path = format!("{}.sentiment", theme_path);
        let value = self.string(obj, "sentiment", &path)?;
        let parsed = ThemeSentiment::parse(&value);
        if parsed.is_none() {
            self.push(
                ValidationError::new(
                    ValidationErrorKind::InvalidValue,
                    path,
                    "Invalid theme sentiment",
                )
                .with_comparison(ThemeSentiment::VALUES.join(" | "), format!("\"{}\"", value)),
            );
        }
        parsed
    }

    fn quotes(&mut self, theme: &Object, theme_path: &str) -> Option<Vec<SupportingQuote>> {
        let path = format!("{}.supportingQuotes", theme_path);
        let items = self.array(theme, "supportingQuotes", &path)?;

        let in_range = (MIN_QUOTES_PER_THEME..=MAX_QUOTES_PER_THEME).contains(&items.len());
        if !in_range {
            self.push(
                ValidationError::new(
                    ValidationErrorKind::OutOfRange,
                    path.as_str(),
                    format!(
                        "Each theme needs {} to {} supporting quotes",
                        MIN_QUOTES_PER_THEME, MAX_QUOTES_PER_THEME
                    ),
                )
                .with_comparison(
                    format!("{}-{} quotes", MIN_QUOTES_PER_THEME, MAX_QUOTES_PER_THEME),
                    items.len().to_string(),
                ),
            );
        }

        let mut quotes = Vec::with_capacity(items.len());
        let mut all_valid = in_range;
        for (idx, item) in items.iter().enumerate() {
            match self.quote(item, &format!("{}[{}]", path, idx)) {
                Some(quote) => quotes.push(quote),
                None => all_valid = false,
            }
        }

        all_valid.then_some(quotes)
    }

    fn quote(&mut self, value: &Value, path: &str) -> Option<SupportingQuote> {
        let obj = self.element(value, path)?;

        let review_id_path = format!("{}.reviewId", path);
        let review_id = self
            .non_empty_string(obj, "reviewId", &review_id_path)
            .and_then(|id| {
                if self.ctx.knows_review(&id) {
                    Some(id)
                } else {
                    self.push(
                        ValidationError::new(
                            ValidationErrorKind::Reference,
                            review_id_path.as_str(),
                            "Quote references a review that was not analyzed",
                        )
                        .received(format!("\"{}\"", id)),
                    );
                    None
                }
            });

        let excerpt_path = format!("{}.excerpt", path);
        let excerpt = self.string(obj, "excerpt", &excerpt_path).and_then(|text| {
            let length = text.chars().count();
            if length <= MAX_EXCERPT_CHARS {
                Some(text)
            } else {
                self.push(
                    ValidationError::new(
                        ValidationErrorKind::OutOfRange,
                        excerpt_path.as_str(),
                        format!("Excerpt exceeds {} characters", MAX_EXCERPT_CHARS),
                    )
                    .with_comparison(
                        format!("at most {} characters", MAX_EXCERPT_CHARS),
                        format!("{} characters", length),
                    ),
                );
                None
            }
        });

        Some(SupportingQuote {
            review_id: review_id?,
            excerpt: excerpt?,
        })
    }

    // -------------------------------------------------------------------------
    // improvementIdeas
    // -------------------------------------------------------------------------

    fn ideas(&mut self, root: &Object, theme_names: &HashSet<&str>) -> Option<Vec<ImprovementIdea>> {
        let items = self.array(root, "improvementIdeas", "improvementIdeas")?;

        if items.len() > MAX_IMPROVEMENT_IDEAS {
            self.push(
                ValidationError::new(
                    ValidationErrorKind::OutOfRange,
                    "improvementIdeas",
                    format!("At most {} improvement ideas are allowed", MAX_IMPROVEMENT_IDEAS),
                )
                .with_comparison(
                    format!("at most {}", MAX_IMPROVEMENT_IDEAS),
                    items.len().to_string(),
                ),
            );
        }

        let mut ideas = Vec::with_capacity(items.len());
        let mut all_valid = true;
        for (idx, item) in items.iter().enumerate() {
            match self.idea(item, idx, theme_names) {
                Some(idea) => ideas.push(idea),
                None => all_valid = false,
            }
        }

        all_valid.then_some(ideas)
    }

    fn idea(
        &mut self,
        value: &Value,
        idx: usize,
        theme_names: &HashSet<&str>,
    ) -> Option<ImprovementIdea> {
        let path = format!("improvementIdeas[{}]", idx);
        let obj = self.element(value, &path)?;

        let title = self.non_empty_string(obj, "title", &format!("{}.title", path));
        let description =
            self.non_empty_string(obj, "description", &format!("{}.description", path));
        let source_themes = self.source_themes(obj, &path, theme_names);

        Some(ImprovementIdea {
            title: title?,
            description: description?,
            source_themes: source_themes?,
        })
    }

    fn source_themes(
        &mut self,
        idea: &Object,
        idea_path: &str,
        theme_names: &HashSet<&str>,
    ) -> Option<Vec<String>> {
        let path = format!("{}.sourceThemes", idea_path);
        let items = self.array(idea, "sourceThemes", &path)?;

        if items.is_empty() {
            self.push(ValidationError::new(
                ValidationErrorKind::InvalidValue,
                path.as_str(),
                "Improvement idea must reference at least one theme",
            ));
            return None;
        }

        let mut names = Vec::with_capacity(items.len());
        let mut all_valid = true;
        for (idx, item) in items.iter().enumerate() {
            let entry_path = format!("{}[{}]", path, idx);
            let Some(name) = item.as_str() else {
                self.invalid_type(&entry_path, "a string", item);
                all_valid = false;
                continue;
            };

            if theme_names.contains(name) {
                names.push(name.to_string());
            } else {
                let mut known: Vec<&str> = theme_names.iter().copied().collect();
                known.sort_unstable();
                self.push(
                    ValidationError::new(
                        ValidationErrorKind::Reference,
                        entry_path,
                        "Improvement idea references a theme that does not exist",
                    )
                    .with_comparison(
                        format!("one of [{}]", known.join(", ")),
                        format!("\"{}\"", name),
                    ),
                );
                all_valid = false;
            }
        }

        all_valid.then_some(names)
    }
}
