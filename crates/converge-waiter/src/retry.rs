//! Retrying a whole wait on throttling
//!
//! The waiter itself never retries a failed fetch. Callers that want to ride
//! out API throttling wrap the wait in [`retry_wait`], which starts a fresh
//! wait only when the previous one ended with a retryable transport error.

use crate::outcome::{WaitError, WaitOutcome};
use backon::{ExponentialBuilder, Retryable};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Backoff between whole-wait attempts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Retries after the first attempt
    pub max_retries: usize,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            max_retries: 5,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    fn builder(&self) -> ExponentialBuilder {
        let builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries);
        if self.jitter { builder.with_jitter() } else { builder }
    }
}

/// Run `make_wait`, starting over while the outcome is retryable.
///
/// Every non-retryable outcome, success or failure, is returned from the
/// attempt that produced it.
pub async fn retry_wait<P, F, Fut>(policy: &RetryPolicy, make_wait: F) -> WaitOutcome<P>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = WaitOutcome<P>>,
{
    make_wait
        .retry(policy.builder())
        .when(WaitError::is_retryable)
        .notify(|e: &WaitError<P>, dur: Duration| {
            warn!(
                identity = %e.identity(),
                error = %e,
                retry_in_ms = dur.as_millis(),
                "Wait throttled, retrying"
            );
        })
        .await
}
