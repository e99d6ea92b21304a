//! Review Compression
//!
//! Strips review records down to the fields the analysis needs, bounding
//! prompt tokens. Pure projection: no validation, no failure modes.

use crate::constants::analysis::{ANONYMOUS_REVIEWER, UNKNOWN_PLATFORM};
use crate::types::{CompressedReview, ReviewForAnalysis};

/// Project one review onto its minimal prompt representation
pub fn compress_review(review: &ReviewForAnalysis) -> CompressedReview {
    CompressedReview {
        id: review.id.clone(),
        content: review.content.clone(),
        rating: review.rating,
        date: review.created_at.date_naive().format("%Y-%m-%d").to_string(),
        platform: review
            .platform
            .clone()
            .unwrap_or_else(|| UNKNOWN_PLATFORM.to_string()),
        reviewer: review
            .reviewer_name
            .clone()
            .unwrap_or_else(|| ANONYMOUS_REVIEWER.to_string()),
    }
}

/// Compress a batch, preserving order
pub fn compress_reviews(reviews: &[ReviewForAnalysis]) -> Vec<CompressedReview> {
    reviews.iter().map(compress_review).collect()
}
