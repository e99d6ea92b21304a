pub mod analysis;
pub mod error;
pub mod request;

pub use analysis::{
    BreakdownBucket, ImprovementIdea, OverallLabel, SentimentAnalysisResult, SentimentBreakdown,
    SentimentSummary, SupportingQuote, Theme, ThemeSentiment,
};
pub use error::{
    ErrorClassifier, ErrorKind, Result, SentimentError, ValidationError, ValidationErrorKind,
};
pub use request::{AnalysisRequest, CompressedReview, ModelOverrides, ReviewForAnalysis};
