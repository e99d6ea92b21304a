//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Analysis request limits
pub mod analysis {
    /// Minimum number of reviews required before an analysis may run
    pub const MIN_REVIEWS: usize = 10;

    /// Reviewer label used when the review carries no reviewer name
    pub const ANONYMOUS_REVIEWER: &str = "Anonymous";

    /// Platform label used when the review carries no source platform
    pub const UNKNOWN_PLATFORM: &str = "unknown";
}

/// Output schema limits enforced by the validator
pub mod schema {
    /// Maximum number of themes in a result
    pub const MAX_THEMES: usize = 3;

    /// Maximum number of improvement ideas in a result
    pub const MAX_IMPROVEMENT_IDEAS: usize = 3;

    /// Minimum supporting quotes per theme
    pub const MIN_QUOTES_PER_THEME: usize = 1;

    /// Maximum supporting quotes per theme
    pub const MAX_QUOTES_PER_THEME: usize = 2;

    /// Maximum excerpt length (characters)
    pub const MAX_EXCERPT_CHARS: usize = 80;

    /// Upper bound of the sentiment score
    pub const MAX_SENTIMENT_SCORE: i64 = 100;

    /// Allowed deviation of the percentage sum from 100 (rounding)
    pub const PERCENTAGE_TOLERANCE: f64 = 1.0;

    /// Characters of raw output kept in malformed-output diagnostics
    pub const MALFORMED_PREVIEW_CHARS: usize = 200;
}

/// Model invocation defaults
pub mod model {
    /// Default general-purpose model
    pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

    /// Low temperature for consistent analyses
    pub const DEFAULT_TEMPERATURE: f32 = 0.3;

    /// Maximum output tokens
    pub const DEFAULT_MAX_TOKENS: u32 = 2500;

    /// Request timeout (milliseconds)
    pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

    /// OpenAI-compatible API base
    pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
}

/// Pricing and pre-flight estimation constants
pub mod pricing {
    /// USD per 1K prompt tokens
    pub const INPUT_COST_PER_1K: f64 = 0.000_15;

    /// USD per 1K completion tokens
    pub const OUTPUT_COST_PER_1K: f64 = 0.000_6;

    /// Average prompt tokens contributed by one compressed review
    pub const AVG_TOKENS_PER_REVIEW: u32 = 120;

    /// Fixed prompt tokens (system role, task body, schema description)
    pub const PROMPT_OVERHEAD_TOKENS: u32 = 900;

    /// Expected completion tokens for one analysis
    pub const RESPONSE_TOKENS: u32 = 1_200;

    /// Relative width of the estimate band (+/-)
    pub const ESTIMATE_BAND: f64 = 0.20;
}

/// Caller-side retry defaults
pub mod retry {
    /// Default retries after the first attempt
    pub const DEFAULT_MAX_RETRIES: usize = 2;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 1_000;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECS: u64 = 30;

    /// Backoff multiplier
    pub const BACKOFF_FACTOR: f32 = 2.0;
}

/// Provider error handling
pub mod network {
    /// Characters of an error response body kept in error messages
    pub const ERROR_BODY_PREVIEW_CHARS: usize = 300;

    /// Suggested wait after a rate-limit response without Retry-After
    pub const RATE_LIMIT_DELAY_SECS: u64 = 30;

    /// Suggested wait before retrying a timed out request
    pub const TIMEOUT_RETRY_DELAY_SECS: u64 = 5;
}
