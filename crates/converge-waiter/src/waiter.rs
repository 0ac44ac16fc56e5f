//! Resource state waiting with exponential backoff and cancellation support.
//!
//! Drives repeated polls of one remote object until it reaches a status in the
//! spec's target set, a status in its failure set, the spec's deadline, or a
//! fetch error that is not a (transient) NotFound.

use crate::backoff::Backoff;
use crate::fetch::{FetchError, StatusFetcher};
use crate::outcome::{TimeoutReason, WaitError, WaitOutcome, WaitPhase, WaitSuccess};
use crate::snapshot::StatusSnapshot;
use crate::spec::{WaitIntent, WaitSpec, WaitTimeout};
use converge_common::ResourceIdentity;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Single-use waiter for one remote object.
///
/// [`StateWaiter::wait`] consumes the waiter, so no poll can happen after an
/// outcome has been produced.
#[derive(Debug)]
pub struct StateWaiter {
    identity: ResourceIdentity,
    spec: WaitSpec,
    cancel: Option<CancellationToken>,
    phase: WaitPhase,
}

impl StateWaiter {
    pub fn new(identity: ResourceIdentity, spec: WaitSpec) -> Self {
        Self {
            identity,
            spec,
            cancel: None,
            phase: WaitPhase::Pending,
        }
    }

    /// Stop waiting (with a `Timeout` outcome) when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn identity(&self) -> &ResourceIdentity {
        &self.identity
    }

    pub fn spec(&self) -> &WaitSpec {
        &self.spec
    }

    pub fn phase(&self) -> WaitPhase {
        self.phase
    }

    /// Poll `fetcher` until the object reaches a terminal state.
    ///
    /// # Returns
    /// * `Ok` - A target status was observed, or a delete wait saw the object gone
    /// * `Err` - Fatal status, timeout/cancellation, NotFound past the grace
    ///   window, or a transport error from the fetch
    pub async fn wait<P, F>(mut self, fetcher: &F) -> WaitOutcome<P>
    where
        F: StatusFetcher<P> + ?Sized,
    {
        let start = Instant::now();
        let deadline = match self.spec.timeout() {
            WaitTimeout::Within(timeout) => Some(start + timeout),
            WaitTimeout::Indefinite | WaitTimeout::PollOnce => None,
        };
        let mut backoff = Backoff::new(*self.spec.backoff());
        let mut attempts = 0u32;
        let mut last: Option<StatusSnapshot<P>> = None;

        loop {
            // Check cancellation before each attempt
            if self.is_cancelled() {
                return Err(self.timed_out(TimeoutReason::Cancelled, attempts, start, last));
            }

            // Check timeout; the first poll always runs
            if let Some(deadline) = deadline {
                if attempts > 0 && Instant::now() >= deadline {
                    return Err(self.timed_out(TimeoutReason::Deadline, attempts, start, last));
                }
            }

            self.transition(WaitPhase::Polling);
            attempts += 1;

            // A slow fetch is abandoned once cancelled or past the deadline
            let raced = tokio::select! {
                biased;
                _ = cancelled(self.cancel.as_ref()) => Err(TimeoutReason::Cancelled),
                _ = expired(deadline) => Err(TimeoutReason::Deadline),
                result = fetcher.fetch(&self.identity) => Ok(result),
            };
            let result = match raced {
                Ok(result) => result,
                Err(reason) => return Err(self.timed_out(reason, attempts, start, last)),
            };

            match result {
                Ok(snapshot) if self.spec.is_target(snapshot.status()) => {
                    self.transition(WaitPhase::Succeeded);
                    info!(
                        identity = %self.identity,
                        intent = %self.spec.intent(),
                        status = %snapshot.status(),
                        attempts,
                        "Resource reached target status"
                    );
                    return Ok(WaitSuccess {
                        snapshot: Some(snapshot),
                        attempts,
                        elapsed: start.elapsed(),
                    });
                }
                Ok(snapshot) if self.spec.is_failure(snapshot.status()) => {
                    self.transition(WaitPhase::FatalStatus);
                    warn!(
                        identity = %self.identity,
                        status = %snapshot.status(),
                        attempts,
                        "Resource reached failure status"
                    );
                    return Err(WaitError::FatalStatus {
                        identity: self.identity,
                        attempts,
                        snapshot,
                    });
                }
                Ok(snapshot) => {
                    debug!(
                        identity = %self.identity,
                        attempt = attempts,
                        status = %snapshot.status(),
                        "Resource in transitional status"
                    );
                    last = Some(snapshot);
                }
                Err(e) if e.is_not_found() => {
                    if self.spec.intent() == WaitIntent::Delete {
                        self.transition(WaitPhase::Succeeded);
                        info!(identity = %self.identity, attempts, "Resource is gone");
                        return Ok(WaitSuccess {
                            snapshot: None,
                            attempts,
                            elapsed: start.elapsed(),
                        });
                    }
                    let elapsed = start.elapsed();
                    if elapsed >= self.spec.not_found_grace() {
                        return Err(self.not_found(attempts, elapsed, e));
                    }
                    debug!(
                        identity = %self.identity,
                        attempt = attempts,
                        elapsed_ms = elapsed.as_millis(),
                        "Resource not visible yet, retrying"
                    );
                }
                Err(e) => {
                    self.transition(WaitPhase::TransportError);
                    warn!(
                        identity = %self.identity,
                        attempts,
                        error = %e,
                        "Resource status check failed"
                    );
                    return Err(WaitError::Transport {
                        identity: self.identity,
                        attempts,
                        source: e,
                    });
                }
            }

            let base = backoff.next_delay();
            let delay = backoff.jittered(base);
            let delay = match self.spec.timeout() {
                WaitTimeout::PollOnce => {
                    return Err(self.timed_out(TimeoutReason::Deadline, attempts, start, last));
                }
                WaitTimeout::Within(_) => {
                    let remaining = deadline
                        .map(|d| d.saturating_duration_since(Instant::now()))
                        .unwrap_or(Duration::ZERO);
                    if remaining.is_zero() {
                        return Err(self.timed_out(TimeoutReason::Deadline, attempts, start, last));
                    }
                    delay.min(remaining)
                }
                WaitTimeout::Indefinite => delay,
            };

            // Check cancellation before sleeping
            if self.is_cancelled() {
                return Err(self.timed_out(TimeoutReason::Cancelled, attempts, start, last));
            }

            self.transition(WaitPhase::Sleeping);
            debug!(
                identity = %self.identity,
                attempt = attempts,
                delay_ms = delay.as_millis(),
                "Resource not ready, retrying"
            );

            // Wait with cancellation support
            let interrupted = tokio::select! {
                _ = tokio::time::sleep(delay) => false,
                _ = cancelled(self.cancel.as_ref()) => true,
            };
            if interrupted {
                return Err(self.timed_out(TimeoutReason::Cancelled, attempts, start, last));
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    fn transition(&mut self, next: WaitPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal wait transition {} -> {}",
            self.phase,
            next
        );
        trace!(identity = %self.identity, from = %self.phase, to = %next, "Wait phase transition");
        self.phase = next;
    }

    fn timed_out<P>(
        &mut self,
        reason: TimeoutReason,
        attempts: u32,
        start: Instant,
        last: Option<StatusSnapshot<P>>,
    ) -> WaitError<P> {
        self.transition(WaitPhase::TimedOut);
        let elapsed = start.elapsed();
        warn!(
            identity = %self.identity,
            %reason,
            attempts,
            elapsed_ms = elapsed.as_millis(),
            last_status = last.as_ref().map(StatusSnapshot::status),
            "Timed out waiting for resource"
        );
        WaitError::Timeout {
            identity: self.identity.clone(),
            reason,
            attempts,
            elapsed,
            last,
        }
    }

    fn not_found<P>(
        &mut self,
        attempts: u32,
        elapsed: Duration,
        error: FetchError,
    ) -> WaitError<P> {
        self.transition(WaitPhase::NotFound);
        warn!(
            identity = %self.identity,
            attempts,
            elapsed_ms = elapsed.as_millis(),
            "Resource still not found after grace window"
        );
        WaitError::NotFound {
            identity: self.identity.clone(),
            attempts,
            elapsed,
            message: error.to_string(),
        }
    }
}

/// Resolves when `token` is cancelled; never without one.
async fn cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

/// Resolves at `deadline`; never without one.
async fn expired(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Wait for `identity` to reach a terminal state described by `spec`.
///
/// # Example
/// ```ignore
/// let outcome = wait_for_state(
///     Some(&cancel_token),
///     &ResourceIdentity::single("gc-1"),
///     &|id: ResourceIdentity| async move { describe_global_cluster(&id).await },
///     &spec,
/// )
/// .await?;
/// ```
pub async fn wait_for_state<P, F>(
    cancel: Option<&CancellationToken>,
    identity: &ResourceIdentity,
    fetcher: &F,
    spec: &WaitSpec,
) -> WaitOutcome<P>
where
    F: StatusFetcher<P> + ?Sized,
{
    let mut waiter = StateWaiter::new(identity.clone(), spec.clone());
    if let Some(token) = cancel {
        waiter = waiter.with_cancellation(token.clone());
    }
    waiter.wait(fetcher).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn spec(intent: WaitIntent) -> crate::spec::WaitSpecBuilder {
        WaitSpec::builder(intent)
            .initial_delay(Duration::from_millis(10))
            .max_delay(Duration::from_millis(50))
            .jitter(0.0)
            .timeout(WaitTimeout::Within(Duration::from_secs(5)))
    }

    /// Fetcher that returns `statuses[n]` on the n-th call (repeating the last one)
    fn sequence(
        statuses: &'static [&'static str],
        calls: Arc<AtomicU32>,
    ) -> impl Fn(ResourceIdentity) -> std::future::Ready<Result<StatusSnapshot<()>, FetchError>> + Send + Sync
    {
        move |_id| {
            let n = calls.fetch_add(1, Ordering::SeqCst) as usize;
            let status = statuses[n.min(statuses.len() - 1)];
            std::future::ready(Ok(StatusSnapshot::status_only(status)))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_succeeds_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let spec = spec(WaitIntent::Create).target(["ACTIVE"]).build().unwrap();
        let fetch = sequence(&["ACTIVE"], calls.clone());

        let success = wait_for_state(None, &"grp".into(), &fetch, &spec).await.unwrap();

        assert_eq!(success.status(), Some("ACTIVE"));
        assert_eq!(success.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let spec = spec(WaitIntent::Create).target(["ACTIVE"]).build().unwrap();
        let fetch = sequence(&["CREATING", "CREATING", "ACTIVE"], calls.clone());

        let success = wait_for_state(None, &"grp".into(), &fetch, &spec).await.unwrap();

        assert_eq!(success.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_status_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let spec = spec(WaitIntent::Create)
            .target(["available"])
            .failure(["failed"])
            .build()
            .unwrap();
        let fetch = sequence(&["failed"], calls.clone());

        let err = wait_for_state(None, &"gc-1".into(), &fetch, &spec).await.unwrap_err();

        assert!(matches!(err, WaitError::FatalStatus { attempts: 1, .. }));
        assert_eq!(err.last_snapshot().map(StatusSnapshot::status), Some("failed"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_timeout_keeps_last_snapshot() {
        let calls = Arc::new(AtomicU32::new(0));
        let spec = spec(WaitIntent::Create)
            .target(["ACTIVE"])
            .timeout(WaitTimeout::Within(Duration::from_millis(100)))
            .build()
            .unwrap();
        let fetch = sequence(&["CREATING"], calls.clone());

        let err = wait_for_state(None, &"grp".into(), &fetch, &spec).await.unwrap_err();

        match err {
            WaitError::Timeout {
                reason, last, attempts, ..
            } => {
                assert_eq!(reason, TimeoutReason::Deadline);
                assert_eq!(last.unwrap().status(), "CREATING");
                assert_eq!(attempts, calls.load(Ordering::SeqCst));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let spec = spec(WaitIntent::Update)
            .target(["available"])
            .timeout(WaitTimeout::PollOnce)
            .build()
            .unwrap();
        let fetch = sequence(&["modifying", "available"], calls.clone());

        let err = wait_for_state(None, &"gc-1".into(), &fetch, &spec).await.unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(err.attempts(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_cancellation() {
        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();

        // Cancel after a short delay
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel_clone.cancel();
        });

        let calls = Arc::new(AtomicU32::new(0));
        let spec = spec(WaitIntent::Create)
            .target(["ACTIVE"])
            .timeout(WaitTimeout::Indefinite)
            .build()
            .unwrap();
        let fetch = sequence(&["CREATING"], calls.clone());

        let err = wait_for_state(Some(&cancel), &"grp".into(), &fetch, &spec)
            .await
            .unwrap_err();

        match err {
            WaitError::Timeout { reason, last, .. } => {
                assert_eq!(reason, TimeoutReason::Cancelled);
                assert_eq!(last.unwrap().status(), "CREATING");
            }
            other => panic!("expected cancellation, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_first_poll() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let calls = Arc::new(AtomicU32::new(0));
        let spec = spec(WaitIntent::Create).target(["ACTIVE"]).build().unwrap();
        let fetch = sequence(&["ACTIVE"], calls.clone());

        let err = wait_for_state(Some(&cancel), &"grp".into(), &fetch, &spec)
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert!(err.last_snapshot().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let spec = spec(WaitIntent::Create).target(["ACTIVE"]).build().unwrap();
        let fetch = move |_id: ResourceIdentity| {
            c.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Err::<StatusSnapshot<()>, _>(FetchError::transport_with_code(
                "AccessDeniedException",
                anyhow::anyhow!("not authorized"),
            )))
        };

        let err = wait_for_state(None, &"grp".into(), &fetch, &spec).await.unwrap_err();

        assert_eq!(err.phase(), WaitPhase::TransportError);
        assert!(!err.is_retryable());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_not_found_is_success() {
        let spec = spec(WaitIntent::Delete).failure(["failed"]).build().unwrap();
        let fetch = |_id: ResourceIdentity| {
            std::future::ready(Err::<StatusSnapshot<()>, _>(FetchError::not_found("gone")))
        };

        let success = wait_for_state(None, &"gc-1".into(), &fetch, &spec).await.unwrap();

        assert!(success.is_absent());
        assert_eq!(success.attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_not_found_without_grace_fails() {
        let spec = spec(WaitIntent::Create).target(["ACTIVE"]).build().unwrap();
        let fetch = |_id: ResourceIdentity| {
            std::future::ready(Err::<StatusSnapshot<()>, _>(FetchError::not_found("gone")))
        };

        let err = wait_for_state(None, &"grp".into(), &fetch, &spec).await.unwrap_err();

        assert!(matches!(err, WaitError::NotFound { attempts: 1, .. }));
    }

    type BoxedFetch = Pin<Box<dyn Future<Output = Result<StatusSnapshot<()>, FetchError>> + Send>>;

    /// Fetcher whose describe call takes `latency` before answering `status`
    fn slow(
        status: &'static str,
        latency: Duration,
    ) -> impl Fn(ResourceIdentity) -> BoxedFetch + Send + Sync {
        move |_id| -> BoxedFetch {
            Box::pin(async move {
                tokio::time::sleep(latency).await;
                Ok(StatusSnapshot::status_only(status))
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_fetch_stops_at_deadline() {
        let spec = spec(WaitIntent::Create)
            .target(["ACTIVE"])
            .timeout(WaitTimeout::Within(Duration::from_secs(10)))
            .build()
            .unwrap();
        let fetch = slow("ACTIVE", Duration::from_secs(3600));

        let err = wait_for_state(None, &"grp".into(), &fetch, &spec).await.unwrap_err();

        match err {
            WaitError::Timeout {
                reason,
                attempts,
                elapsed,
                last,
                ..
            } => {
                assert_eq!(reason, TimeoutReason::Deadline);
                assert_eq!(attempts, 1);
                assert_eq!(elapsed, Duration::from_secs(10));
                assert!(last.is_none());
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_fetch_stops_on_cancel() {
        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            cancel_clone.cancel();
        });
        let spec = spec(WaitIntent::Create)
            .target(["ACTIVE"])
            .timeout(WaitTimeout::Indefinite)
            .build()
            .unwrap();
        let fetch = slow("ACTIVE", Duration::from_secs(3600));
        let start = Instant::now();

        let err = wait_for_state(Some(&cancel), &"grp".into(), &fetch, &spec)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WaitError::Timeout {
                reason: TimeoutReason::Cancelled,
                ..
            }
        ));
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_waits_until_cancelled() {
        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            cancel_clone.cancel();
        });
        let calls = Arc::new(AtomicU32::new(0));
        let spec = spec(WaitIntent::Create)
            .target(["ACTIVE"])
            .timeout(WaitTimeout::Within(Duration::ZERO))
            .build()
            .unwrap();
        let fetch = sequence(&["CREATING"], calls.clone());

        let err = wait_for_state(Some(&cancel), &"grp".into(), &fetch, &spec)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WaitError::Timeout {
                reason: TimeoutReason::Cancelled,
                ..
            }
        ));
        assert!(calls.load(Ordering::SeqCst) > 1);
    }

    #[test]
    fn test_new_waiter_is_pending() {
        let spec = WaitSpec::builder(WaitIntent::Delete).build().unwrap();
        let waiter = StateWaiter::new("gc-1".into(), spec);
        assert_eq!(waiter.phase(), WaitPhase::Pending);
        assert_eq!(waiter.identity().to_string(), "gc-1");
    }
}
