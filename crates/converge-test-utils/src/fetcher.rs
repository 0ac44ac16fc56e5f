//! Scripted status fetchers
//!
//! A [`ScriptedFetcher`] replays a fixed list of poll results, repeating the
//! last one once the script runs out, and records every call it receives.

use async_trait::async_trait;
use converge_common::ResourceIdentity;
use converge_waiter::{FetchError, StatusFetcher, StatusSnapshot};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// One scripted poll result
#[derive(Debug, Clone)]
pub enum Step<P> {
    /// The object exists with this status and payload
    Status(String, P),
    /// The describe call reported the object missing
    NotFound,
    /// The describe call returned an empty output
    Empty,
    /// A transport failure with the given AWS error code
    Transport(String),
}

impl Step<()> {
    pub fn status(status: impl Into<String>) -> Self {
        Step::Status(status.into(), ())
    }
}

impl<P: Clone> Step<P> {
    fn to_result(&self, identity: &ResourceIdentity) -> Result<StatusSnapshot<P>, FetchError> {
        match self {
            Step::Status(status, payload) => {
                Ok(StatusSnapshot::new(status.clone(), payload.clone()))
            }
            Step::NotFound => Err(FetchError::not_found(format!("{identity} does not exist"))),
            Step::Empty => Err(FetchError::empty_result(identity)),
            Step::Transport(code) => Err(FetchError::transport_with_code(
                code.clone(),
                std::io::Error::other(format!("{code} while describing {identity}")),
            )),
        }
    }
}

/// Fetcher that replays a script of poll results
#[derive(Debug)]
pub struct ScriptedFetcher<P = ()> {
    steps: Vec<Step<P>>,
    latency: Option<Duration>,
    calls: AtomicU32,
    seen: Mutex<Vec<ResourceIdentity>>,
}

impl<P> ScriptedFetcher<P> {
    /// # Panics
    /// If `steps` is empty.
    pub fn new(steps: impl IntoIterator<Item = Step<P>>) -> Self {
        let steps: Vec<_> = steps.into_iter().collect();
        assert!(!steps.is_empty(), "a scripted fetcher needs at least one step");
        Self {
            steps,
            latency: None,
            calls: AtomicU32::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Sleep this long inside every fetch
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of fetches made so far
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Identities passed to each fetch, in call order
    pub fn seen(&self) -> Vec<ResourceIdentity> {
        self.seen.lock().unwrap().clone()
    }
}

impl ScriptedFetcher<()> {
    /// Script of bare statuses
    pub fn statuses<I, S>(statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(statuses.into_iter().map(Step::status))
    }
}

#[async_trait]
impl<P> StatusFetcher<P> for ScriptedFetcher<P>
where
    P: Clone + Send + Sync + 'static,
{
    async fn fetch(&self, identity: &ResourceIdentity) -> Result<StatusSnapshot<P>, FetchError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
        self.seen.lock().unwrap().push(identity.clone());
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.steps[n.min(self.steps.len() - 1)].to_result(identity)
    }
}
