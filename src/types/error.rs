//! Unified Error Type System
//!
//! Centralized error types for the analysis pipeline.
//! Every failure is expressed as a `SentimentError` whose `ErrorKind` belongs
//! to a closed taxonomy, so callers match on kinds instead of message text.
//!
//! ## Error Kinds
//!
//! - **Precondition**: insufficient reviews, missing business name, no reviews,
//!   missing configuration (fail fast, never retried)
//! - **Transport**: timeout, rate limit (retry with backoff)
//! - **Output**: malformed JSON, schema violations (retry, generative variance)
//! - **Unknown**: anything else, original message preserved

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::constants::network as net_constants;

// =============================================================================
// Error Kinds
// =============================================================================

/// Closed taxonomy of analysis failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Fewer reviews than the configured minimum
    InsufficientReviews,
    /// Blank business name
    MissingBusinessName,
    /// Empty review list
    NoReviewsProvided,
    /// Missing credential or invalid configuration
    ConfigurationError,
    /// Provider call exceeded the configured timeout
    Timeout,
    /// Provider signaled rate limiting
    RateLimited,
    /// Response text was not valid JSON
    MalformedOutput,
    /// Parsed JSON violated the output schema or its invariants
    SchemaValidationFailed,
    /// Anything else; original message preserved
    UnknownFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientReviews => write!(f, "INSUFFICIENT_REVIEWS"),
            Self::MissingBusinessName => write!(f, "MISSING_BUSINESS_NAME"),
            Self::NoReviewsProvided => write!(f, "NO_REVIEWS_PROVIDED"),
            Self::ConfigurationError => write!(f, "CONFIGURATION_ERROR"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::RateLimited => write!(f, "RATE_LIMITED"),
            Self::MalformedOutput => write!(f, "MALFORMED_OUTPUT"),
            Self::SchemaValidationFailed => write!(f, "SCHEMA_VALIDATION_FAILED"),
            Self::UnknownFailure => write!(f, "UNKNOWN_FAILURE"),
        }
    }
}

impl ErrorKind {
    /// Local checks that fail before any network call
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::InsufficientReviews
                | Self::MissingBusinessName
                | Self::NoReviewsProvided
                | Self::ConfigurationError
        )
    }

    /// Whether a caller may safely retry the same request
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::RateLimited | Self::MalformedOutput | Self::SchemaValidationFailed
        )
    }

    /// Recommended wait before a retry
    pub fn recommended_delay(&self) -> Duration {
        match self {
            Self::RateLimited => Duration::from_secs(net_constants::RATE_LIMIT_DELAY_SECS),
            Self::Timeout => Duration::from_secs(net_constants::TIMEOUT_RETRY_DELAY_SECS),
            Self::MalformedOutput | Self::SchemaValidationFailed => Duration::from_secs(1),
            _ => Duration::ZERO,
        }
    }

    /// Message suitable for end users
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InsufficientReviews => {
                "Not enough reviews yet. At least 10 reviews are needed for an analysis."
            }
            Self::MissingBusinessName => "A business name is required to run an analysis.",
            Self::NoReviewsProvided => "No reviews were provided for analysis.",
            Self::ConfigurationError => {
                "The analysis service is not configured. Please contact support."
            }
            Self::Timeout => "The analysis took too long to complete. Please try again.",
            Self::RateLimited => "The analysis service is busy. Please try again in a moment.",
            Self::MalformedOutput => {
                "The analysis service returned an unreadable response. Please try again."
            }
            Self::SchemaValidationFailed => {
                "The analysis did not pass quality checks. Please try again."
            }
            Self::UnknownFailure => "The analysis failed unexpectedly. Please try again later.",
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// What a validation error is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// Required field missing
    MissingField,
    /// Field present with the wrong JSON type
    InvalidType,
    /// Value outside an allowed set or empty when it must not be
    InvalidValue,
    /// Numeric value or length out of range
    OutOfRange,
    /// Cross-field check failed
    Consistency,
    /// Reference to an id or name that does not exist
    Reference,
}

/// Single flat validation violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    /// Path of the offending field, e.g. `themes[0].supportingQuotes`
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)?;
        match (&self.expected, &self.received) {
            (Some(expected), Some(received)) => {
                write!(f, " (expected {}, received {})", expected, received)
            }
            (Some(expected), None) => write!(f, " (expected {})", expected),
            (None, Some(received)) => write!(f, " (received {})", received),
            (None, None) => Ok(()),
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn new(
        kind: ValidationErrorKind,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
            message: message.into(),
            expected: None,
            received: None,
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("Missing required field '{}'", field);
        Self::new(ValidationErrorKind::MissingField, field, message)
    }

    /// Add expected/received values
    pub fn with_comparison(
        mut self,
        expected: impl Into<String>,
        received: impl Into<String>,
    ) -> Self {
        self.expected = Some(expected.into());
        self.received = Some(received.into());
        self
    }

    pub fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn received(mut self, received: impl Into<String>) -> Self {
        self.received = Some(received.into());
        self
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum SentimentError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Precondition Errors
    // -------------------------------------------------------------------------
    #[error("Insufficient reviews: {provided} provided, at least {required} required")]
    InsufficientReviews { provided: usize, required: usize },

    #[error("Business name is required")]
    MissingBusinessName,

    #[error("No reviews provided")]
    NoReviewsProvided,

    #[error("Config error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    // -------------------------------------------------------------------------
    // Output Errors
    // -------------------------------------------------------------------------
    #[error("Malformed model output: {message}. Content preview: {preview}")]
    MalformedOutput { message: String, preview: String },

    #[error("Model output failed validation with {} error(s)", .errors.len())]
    SchemaValidation { errors: Vec<ValidationError> },

    #[error("Analysis failed: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, SentimentError>;

impl SentimentError {
    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown(message.into())
    }

    pub fn rate_limited(message: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self::RateLimited {
            message: message.into(),
            retry_after,
        }
    }

    /// Map to the closed taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientReviews { .. } => ErrorKind::InsufficientReviews,
            Self::MissingBusinessName => ErrorKind::MissingBusinessName,
            Self::NoReviewsProvided => ErrorKind::NoReviewsProvided,
            Self::Config(_) => ErrorKind::ConfigurationError,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::MalformedOutput { .. } => ErrorKind::MalformedOutput,
            Self::SchemaValidation { .. } => ErrorKind::SchemaValidationFailed,
            Self::Io(_) | Self::Json(_) | Self::Unknown(_) => ErrorKind::UnknownFailure,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    /// Get recommended retry delay, preferring a provider-supplied hint
    pub fn recommended_delay(&self) -> Duration {
        match self {
            Self::RateLimited {
                retry_after: Some(delay),
                ..
            } => *delay,
            _ => self.kind().recommended_delay(),
        }
    }

    pub fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }

    /// Validation errors carried by a schema failure (empty otherwise)
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::SchemaValidation { errors } => errors,
            _ => &[],
        }
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps raw provider failures into the closed taxonomy
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an error message from the provider transport
    pub fn classify(message: &str, timeout: Duration) -> SentimentError {
        let lower = message.to_lowercase();

        if lower.contains("rate limit")
            || lower.contains("status 429")
            || lower.contains("http 429")
            || lower.contains("too many requests")
        {
            return SentimentError::rate_limited(message, None);
        }

        if lower.contains("timeout") || lower.contains("timed out") || lower.contains("deadline")
        {
            return SentimentError::timeout(message, timeout);
        }

        SentimentError::unknown(message)
    }

    /// Classify HTTP status code directly (more accurate than string matching)
    pub fn classify_http_status(
        status: u16,
        message: &str,
        retry_after: Option<Duration>,
        timeout: Duration,
    ) -> SentimentError {
        match status {
            429 => SentimentError::rate_limited(message, retry_after),
            408 | 504 => SentimentError::timeout(message, timeout),
            _ => SentimentError::unknown(format!("HTTP {}: {}", status, message)),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
