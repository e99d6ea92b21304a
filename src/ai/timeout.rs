//! Timeout Wrapping
//!
//! Bounds an async operation by a deadline and reports expiry as
//! `SentimentError::Timeout`. The abandoned future is dropped.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::ai::timeout::with_timeout;
//!
//! let response = with_timeout(
//!     params.timeout,
//!     provider.generate(&prompt, &params),
//!     "model request",
//! ).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::types::{Result, SentimentError};

/// Execute an async operation with a timeout
///
/// Returns a timeout error if the operation doesn't complete within the specified duration.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(SentimentError::timeout(operation_name, timeout)),
    }
}
