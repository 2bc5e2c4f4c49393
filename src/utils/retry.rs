//! Retry with exponential backoff for transient fetch failures
//!
//! Transient failures (timeouts, connection errors, 5xx responses) are
//! retried up to a bounded attempt count with exponential backoff and
//! optional jitter; the final error surfaces once the attempts are
//! exhausted. Permanent failures fail fast.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::errors::SourceError;

/// Configuration for retry behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds
    pub initial_delay_ms: u64,
    /// Upper bound for any single delay, in milliseconds
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Whether to add jitter to delays
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 500,
            max_delay_ms: 5_000,
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (network timeouts, server busy, connection reset)
/// should return `true`. Permanent failures (bad URL, 4xx status) should
/// return `false`.
pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for SourceError {
    fn is_retryable(&self) -> bool {
        match self {
            SourceError::Timeout { .. } => true,
            SourceError::Http { status, .. } => *status == 429 || (500..=599).contains(status),
            SourceError::Network { source, .. } => source.is_timeout() || source.is_connect(),
            SourceError::InvalidUrl { .. } => false,
        }
    }
}

/// Execute an async operation with retry logic
///
/// Returns the result of the first successful attempt, or the last error
/// once `max_attempts` attempts have failed or a non-retryable error is
/// encountered.
pub async fn with_retry<T, E, F, Fut>(config: &RetryConfig, mut operation: F, label: &str) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!("'{}' succeeded on attempt {}/{}", label, attempt, max_attempts);
                }
                return Ok(result);
            }
            Err(err) => {
                if !err.is_retryable() {
                    debug!("'{}' failed with non-retryable error: {}", label, err);
                    return Err(err);
                }

                last_error = Some(err);

                if attempt < max_attempts {
                    let delay = backoff_delay(config, attempt);
                    warn!(
                        "'{}' failed on attempt {}/{}, retrying in {:?}: {}",
                        label,
                        attempt,
                        max_attempts,
                        delay,
                        last_error.as_ref().unwrap()
                    );
                    sleep(delay).await;
                } else {
                    warn!(
                        "'{}' failed after {} attempts: {}",
                        label,
                        max_attempts,
                        last_error.as_ref().unwrap()
                    );
                }
            }
        }
    }

    Err(last_error.unwrap())
}

/// Calculate the delay for the given attempt with exponential backoff,
/// capped at `max_delay_ms`, plus up to 25% jitter when enabled
fn backoff_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let exponential =
        config.initial_delay_ms as f64 * config.backoff_multiplier.powi(attempt as i32 - 1);
    let capped = exponential.min(config.max_delay_ms as f64) as u64;

    let delay_ms = if config.jitter {
        capped + jitter_up_to(capped / 4)
    } else {
        capped
    };

    Duration::from_millis(delay_ms)
}

/// Pseudo-random value in `0..=max_ms` derived from the system clock
fn jitter_up_to(max_ms: u64) -> u64 {
    if max_ms == 0 {
        return 0;
    }
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos() as u64;
    nanos % (max_ms + 1)
}
