//! Bounded fixed-backoff retry driver
//!
//! Only idempotent mutating calls go through here (currently the delete
//! call). The driver branches on the [`Attempt`] tag: retryable failures are
//! retried after a fixed wait, terminal failures return immediately.

use std::future::Future;
use std::time::Duration;

use super::outcome::{ApiFailure, ApiResponse, Attempt};
use crate::config::RetryConfig;

/// How many extra attempts to make and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one
    pub max_retries: u32,
    /// Fixed wait before each retry
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// Total number of attempts, first one included
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_retries, Duration::from_millis(config.backoff_ms))
    }
}

/// Run `op` until it succeeds, fails terminally, or attempts run out.
///
/// `op` receives the 1-based attempt number. When every attempt fails with a
/// retryable error the result is a generic failure carrying
/// `exhausted_message`.
pub async fn run<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    exhausted_message: &str,
    mut op: F,
) -> ApiResponse<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Attempt<T>>,
{
    let max_attempts = policy.max_attempts();

    for attempt in 1..=max_attempts {
        match op(attempt).await {
            Attempt::Success(data) => {
                if attempt > 1 {
                    tracing::info!("{} succeeded on attempt {}", operation, attempt);
                }
                return ApiResponse::Success(data);
            }
            Attempt::TerminalFailure(failure) => {
                tracing::debug!("{} failed terminally: {}", operation, failure);
                return ApiResponse::Failure(failure);
            }
            Attempt::RetryableFailure(failure) => {
                if attempt < max_attempts {
                    tracing::warn!(
                        "{} failed ({}) - retry {}/{} after {}ms",
                        operation,
                        failure,
                        attempt,
                        policy.max_retries,
                        policy.backoff.as_millis()
                    );
                    tokio::time::sleep(policy.backoff).await;
                } else {
                    tracing::error!(
                        "{} failed ({}) - giving up after {} attempts",
                        operation,
                        failure,
                        max_attempts
                    );
                }
            }
        }
    }

    ApiResponse::Failure(ApiFailure::generic(exhausted_message))
}
