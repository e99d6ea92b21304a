//! Validated analysis result types
//!
//! These types are only produced by `SentimentValidator`; they are marked
//! `#[non_exhaustive]` so code outside the crate cannot assemble one by hand.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallLabel {
    Positive,
    Mixed,
    Negative,
}

impl OverallLabel {
    pub const VALUES: [&'static str; 3] = ["positive", "mixed", "negative"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "positive" => Some(Self::Positive),
            "mixed" => Some(Self::Mixed),
            "negative" => Some(Self::Negative),
            _ => None,
        }
    }
}

impl fmt::Display for OverallLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Mixed => write!(f, "mixed"),
            Self::Negative => write!(f, "negative"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeSentiment {
    Strength,
    Improvement,
}

impl ThemeSentiment {
    pub const VALUES: [&'static str; 2] = ["strength", "improvement"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "strength" => Some(Self::Strength),
            "improvement" => Some(Self::Improvement),
            _ => None,
        }
    }
}

impl fmt::Display for ThemeSentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strength => write!(f, "strength"),
            Self::Improvement => write!(f, "improvement"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[non_exhaustive]
pub struct BreakdownBucket {
    pub count: u32,
    pub percentage: f64,
}

/// Counts sum exactly to the review count; percentages sum to 100 +/- 1
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct SentimentBreakdown {
    pub positive: BreakdownBucket,
    pub mixed: BreakdownBucket,
    pub negative: BreakdownBucket,
}

impl SentimentBreakdown {
    pub fn total_count(&self) -> u64 {
        self.positive.count as u64 + self.mixed.count as u64 + self.negative.count as u64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct SentimentSummary {
    pub overall_label: OverallLabel,
    /// 0-100
    pub sentiment_score: u8,
    pub breakdown: SentimentBreakdown,
    pub short_summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct SupportingQuote {
    pub review_id: String,
    pub excerpt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Theme {
    pub name: String,
    pub sentiment: ThemeSentiment,
    pub mention_count: u32,
    pub supporting_quotes: Vec<SupportingQuote>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct ImprovementIdea {
    pub title: String,
    pub description: String,
    /// Each entry names a theme in the same result
    pub source_themes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct SentimentAnalysisResult {
    pub sentiment_summary: SentimentSummary,
    pub themes: Vec<Theme>,
    pub improvement_ideas: Vec<ImprovementIdea>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limitations: Option<String>,
}

impl SentimentAnalysisResult {
    pub fn theme(&self, name: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.name == name)
    }
}
