use anyhow::Result;
use reqwest::StatusCode;
use std::future::Future;
use tokio::time::{Duration, sleep};
use tracing::{debug, warn};

use crate::error::FamiliarError;

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base delay between retries (will be multiplied by 2^attempt)
    pub base_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_millis(base_delay_ms),
            max_delay: Duration::from_secs(60),
        }
    }

    /// Calculate delay for a given attempt (exponential backoff)
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.base_delay * 2u32.saturating_pow(attempt);
        std::cmp::min(delay, self.max_delay)
    }
}

/// Retry a fallible async operation with exponential backoff.
///
/// Errors that [`is_retryable_error`] rejects are returned immediately.
pub async fn retry_with_backoff<F, Fut, T>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(
                        operation = operation_name,
                        attempt, "operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                if attempt >= config.max_retries || !is_retryable_error(&e) {
                    return Err(e);
                }

                let delay = config.delay_for_attempt(attempt);
                warn!(
                    operation = operation_name,
                    attempt,
                    max_retries = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "operation failed, retrying"
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Check if an error is retryable (transient errors).
///
/// Typed errors in the chain decide first; message matching only applies
/// to errors that carry no status information.
pub fn is_retryable_error(error: &anyhow::Error) -> bool {
    for cause in error.chain() {
        if let Some(FamiliarError::SearchAgent { retryable, .. }) =
            cause.downcast_ref::<FamiliarError>()
        {
            return *retryable;
        }
        if let Some(e) = cause.downcast_ref::<reqwest::Error>() {
            return is_retryable_http_error(e);
        }
    }

    is_retryable_message(&format!("{:#}", error).to_lowercase())
}

/// Timeouts, refused connections, 429 and 5xx
pub fn is_retryable_http_error(error: &reqwest::Error) -> bool {
    if error.is_timeout() || error.is_connect() {
        return true;
    }
    error.status().is_some_and(is_retryable_status)
}

pub fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_retryable_message(error_str: &str) -> bool {
    // Network/connection errors
    if error_str.contains("connection")
        || error_str.contains("timeout")
        || error_str.contains("timed out")
        || error_str.contains("network")
    {
        return true;
    }

    // Rate limiting
    if error_str.contains("rate limit") || error_str.contains("too many requests") {
        return true;
    }

    // Server errors (5xx)
    if error_str.contains("internal server error")
        || error_str.contains("bad gateway")
        || error_str.contains("service unavailable")
    {
        return true;
    }

    // API overloaded
    error_str.contains("overloaded")
}
