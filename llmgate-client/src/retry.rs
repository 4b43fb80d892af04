//! Retry with exponential backoff, configured per endpoint group.

use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use llmgate_core::Target;
use tracing::{debug, warn};

use crate::error::{LlmError, Result};

/// Retry behavior for one endpoint group.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_interval: Duration,
    /// Delay multiplier per retry.
    pub multiplier: f64,
    /// Upper bound on any single delay.
    pub max_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&Target::default())
    }
}

impl From<&Target> for RetryPolicy {
    fn from(target: &Target) -> Self {
        Self {
            max_attempts: target.retry_max_attempts.max(1),
            initial_interval: target.retry_interval(),
            multiplier: target.retry_backoff_rate,
            max_interval: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Deterministic backoff; attempts, not elapsed time, bound the loop.
    fn build_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_interval)
            .with_max_interval(self.max_interval)
            .with_multiplier(self.multiplier)
            .with_randomization_factor(0.0)
            .with_max_elapsed_time(None)
            .build()
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// `policy.max_attempts` is reached.
///
/// # Errors
/// The first non-retryable error unchanged, or
/// [`LlmError::RetriesExhausted`] once every attempt failed retryably.
pub async fn with_retry<F, Fut, T>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut backoff = policy.build_backoff();
    let mut attempt = 0;

    loop {
        attempt += 1;

        let err = match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(operation = operation_name, attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) => e,
        };

        if !err.is_retryable() {
            debug!(operation = operation_name, error = %err, "Non-retryable error");
            return Err(err);
        }

        if attempt >= policy.max_attempts {
            warn!(
                operation = operation_name,
                attempt,
                max_attempts = policy.max_attempts,
                error = %err,
                "Max retries exceeded"
            );
            return Err(LlmError::RetriesExhausted {
                attempts: attempt,
                last_error: err.to_string(),
            });
        }

        let wait = backoff.next_backoff().unwrap_or(policy.max_interval);
        warn!(
            operation = operation_name,
            attempt,
            wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "Retrying after backoff"
        );
        tokio::time::sleep(wait).await;
    }
}
