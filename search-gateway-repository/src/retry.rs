//! Retry with exponential backoff for outbound cluster calls.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio_retry::{strategy::ExponentialBackoff, RetryIf};
use tracing::warn;

use crate::errors::SearchGatewayError;

/// Retry policy for outbound requests.
///
/// Attempt `n` (1-based) that fails with a retryable error waits
/// `initial_backoff * 2^(n-1)`, capped at `max_backoff`, before the next
/// attempt. `max_attempts` counts the first attempt. Delays are whole
/// milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Default backoff with a custom attempt count (at least 1).
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// The delays between attempts, one per retry.
    pub fn strategy(&self) -> impl Iterator<Item = Duration> {
        let initial_ms = u64::try_from(self.initial_backoff.as_millis()).unwrap_or(u64::MAX);
        // The first delay is base * factor, so base 2 doubles from there.
        ExponentialBackoff::from_millis(2)
            .factor((initial_ms / 2).max(1))
            .max_delay(self.max_backoff)
            .take(self.max_attempts.saturating_sub(1) as usize)
    }

    /// Delay after the given failed attempt (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.strategy()
            .nth(attempt.saturating_sub(1) as usize)
            .unwrap_or(self.max_backoff)
    }
}

/// Run `call` until it succeeds, fails with a non-retryable error, or the
/// policy runs out of attempts.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut call: F,
) -> Result<T, SearchGatewayError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SearchGatewayError>>,
{
    with_retry_attempts(policy, operation, move |_| call()).await
}

/// Like [`with_retry`], passing the 1-based attempt number to `call`.
///
/// Writes that may have been applied before a failed attempt use the
/// attempt number to recognise their own earlier effect.
pub async fn with_retry_attempts<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut call: F,
) -> Result<T, SearchGatewayError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, SearchGatewayError>>,
{
    let attempts = AtomicU32::new(0);
    let attempts = &attempts;

    let action = || call(attempts.fetch_add(1, Ordering::SeqCst) + 1);
    let condition = |e: &SearchGatewayError| {
        let attempt = attempts.load(Ordering::SeqCst);
        let retry = e.is_retryable() && attempt < policy.max_attempts;
        if retry {
            warn!(
                operation = operation,
                attempt = attempt,
                max_attempts = policy.max_attempts,
                delay_ms = policy.backoff_for(attempt).as_millis() as u64,
                error = %e,
                "Search cluster call failed, retrying"
            );
        }
        retry
    };

    RetryIf::spawn(policy.strategy(), action, condition).await
}
