//! Bounded retry with exponential backoff
//!
//! | Condition | Action |
//! |-----------|--------|
//! | Network error / timeout | Retry, sleeping `2^attempt` units |
//! | HTTP 429, 500, 502, 503, 504 | Retry, sleeping `2^attempt` units |
//! | Any other non-success status | Fail immediately |
//! | Attempts exhausted | Fail with `RetriesExhausted` |

use crate::config::TransportConfig;
use crate::{TransportError, TransportResult};
use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retry behavior for one logical call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,

    /// Backoff unit; the sleep after attempt `n` is `base_delay * 2^n`
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &TransportConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.backoff_base_ms),
        }
    }

    /// Delay to sleep after the given (1-based) failed attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.min(16)))
    }

    /// Runs `operation` until it succeeds, fails fatally, or the attempt cap
    /// is reached
    ///
    /// The closure receives the 1-based attempt number.
    pub async fn run<F, Fut, T>(&self, url: &str, mut operation: F) -> TransportResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!("Request to {} succeeded on attempt {}", url, attempt);
                    }
                    return Ok(value);
                }
                Err(error) if error.is_transient() => {
                    if attempt >= self.max_attempts {
                        tracing::error!(
                            "Request to {} failed after {} attempts: {}",
                            url,
                            attempt,
                            error
                        );
                        return Err(TransportError::RetriesExhausted {
                            url: url.to_string(),
                            attempts: attempt,
                            last_error: error.to_string(),
                        });
                    }

                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        "Attempt {}/{} for {} failed ({}), retrying in {:?}",
                        attempt,
                        self.max_attempts,
                        url,
                        error,
                        delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    tracing::error!("Request to {} failed: {}", url, error);
                    return Err(error);
                }
            }
        }
    }
}

/// Returns true for statuses worth repeating the request for
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Maps a non-success status onto the transport error taxonomy
pub fn classify_status(url: &str, status: StatusCode) -> TransportError {
    if is_retryable_status(status) {
        TransportError::Transient {
            url: url.to_string(),
            reason: format!("HTTP {}", status.as_u16()),
        }
    } else {
        TransportError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        }
    }
}

/// Maps a reqwest send/read failure onto the transport error taxonomy
pub fn classify_reqwest_error(url: &str, error: &reqwest::Error) -> TransportError {
    if error.is_builder() {
        return TransportError::InvalidRequest {
            url: url.to_string(),
            message: error.to_string(),
        };
    }

    let reason = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    };

    TransportError::Transient {
        url: url.to_string(),
        reason,
    }
}
