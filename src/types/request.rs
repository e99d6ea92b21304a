//! Review and request input types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One customer review supplied by the caller.
///
/// Immutable input: the pipeline only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewForAnalysis {
    /// Unique within one batch
    pub id: String,
    pub content: String,
    /// Star rating, 1-5
    pub rating: u8,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_name: Option<String>,
}

impl ReviewForAnalysis {
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        rating: u8,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            rating,
            created_at,
            platform: None,
            reviewer_name: None,
        }
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn with_reviewer(mut self, reviewer: impl Into<String>) -> Self {
        self.reviewer_name = Some(reviewer.into());
        self
    }
}

/// Minimal projection of a review embedded in the prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompressedReview {
    pub id: String,
    pub content: String,
    pub rating: u8,
    /// Date only, `YYYY-MM-DD`
    pub date: String,
    pub platform: String,
    pub reviewer: String,
}

/// Per-request overrides of the configured model parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelOverrides {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_ms: Option<u64>,
}

impl ModelOverrides {
    pub fn is_empty(&self) -> bool {
        self.model.is_none()
            && self.temperature.is_none()
            && self.max_tokens.is_none()
            && self.timeout_ms.is_none()
    }
}

/// Input of one analysis call
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub reviews: Vec<ReviewForAnalysis>,
    pub business_name: String,
    /// Total reviews stored for the account; used for disclosure text only
    pub total_reviews_in_account: usize,
    pub overrides: Option<ModelOverrides>,
}

impl AnalysisRequest {
    pub fn new(
        reviews: Vec<ReviewForAnalysis>,
        business_name: impl Into<String>,
        total_reviews_in_account: usize,
    ) -> Self {
        Self {
            reviews,
            business_name: business_name.into(),
            total_reviews_in_account,
            overrides: None,
        }
    }

    pub fn with_overrides(mut self, overrides: ModelOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }
}
