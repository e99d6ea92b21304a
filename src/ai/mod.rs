//! AI Integration Layer
//!
//! Everything between a list of reviews and a validated sentiment analysis:
//! review compression, prompt rendering, the model provider seam, output
//! validation, metrics, and caller-side retry.

pub mod compressor;
pub mod metrics;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod retry;
pub mod timeout;
pub mod tokenizer;
pub mod validation;

pub use compressor::{compress_review, compress_reviews};
pub use metrics::{
    AnalysisMetrics, CostEstimator, CostRates, TokenCost, TokenCostEstimate, estimate_token_cost,
};
pub use pipeline::{AnalysisOutcome, SentimentAnalyzer};
pub use prompt::{PromptBuilder, PromptSection, RenderedPrompt, build_sentiment_prompt};
pub use provider::{
    LlmProvider, LlmResponse, ModelParams, OpenAiProvider, ResponseMetadata, ResponseTiming,
    SharedProvider, TokenUsage, create_provider,
};
pub use retry::{RetryPolicy, analyze_with_retry};
pub use timeout::with_timeout;
pub use tokenizer::TokenCounter;
pub use validation::{
    SentimentValidator, ValidationContext, ValidationOutcome, parse_model_output,
    validate_response,
};
