//! Validated wait configuration
//!
//! A [`WaitSpec`] can only be obtained through [`WaitSpecBuilder::build`], so
//! every spec the waiter sees has disjoint target/failure sets and a growing
//! backoff.

use crate::backoff::BackoffPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// What the wait is confirming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitIntent {
    /// A create was submitted; the object may not be visible yet
    Create,
    /// An update was submitted
    Update,
    /// A delete was submitted; absence is success
    Delete,
}

impl fmt::Display for WaitIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WaitIntent::Create => "create",
            WaitIntent::Update => "update",
            WaitIntent::Delete => "delete",
        })
    }
}

/// How long a wait may run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitTimeout {
    /// Until cancelled
    Indefinite,
    /// Until the duration has elapsed
    Within(Duration),
    /// Poll exactly once
    PollOnce,
}

impl WaitTimeout {
    /// Configuration form: a missing or zero timeout means "wait indefinitely".
    /// [`WaitSpec`] applies the same rule to `Within(Duration::ZERO)`.
    pub fn from_secs(secs: Option<u64>) -> Self {
        match secs {
            None | Some(0) => WaitTimeout::Indefinite,
            Some(secs) => WaitTimeout::Within(Duration::from_secs(secs)),
        }
    }

    /// A zero deadline means no deadline
    fn normalized(self) -> Self {
        match self {
            WaitTimeout::Within(timeout) if timeout.is_zero() => WaitTimeout::Indefinite,
            timeout => timeout,
        }
    }
}

/// Wait configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum SpecError {
    /// Same status in both the target and the failure set
    #[error("statuses cannot be both target and failure: {}", .statuses.join(", "))]
    OverlappingStatuses { statuses: Vec<String> },

    /// Backoff would not grow
    #[error("backoff multiplier must be greater than 1, got {0}")]
    InvalidMultiplier(f64),

    /// Jitter outside [0, 1]
    #[error("jitter must be between 0 and 1, got {0}")]
    InvalidJitter(f64),

    /// Non-delete wait with nothing to wait for
    #[error("{0} waits need at least one target status")]
    EmptyTarget(WaitIntent),

    /// initial_delay is zero
    #[error("initial_delay must be greater than 0")]
    ZeroInitialDelay,

    /// initial_delay above max_delay
    #[error("initial_delay ({initial:?}) cannot exceed max_delay ({max:?})")]
    DelayOrder { initial: Duration, max: Duration },
}

/// Configuration for one wait operation
#[derive(Debug, Clone, PartialEq)]
pub struct WaitSpec {
    intent: WaitIntent,
    target: BTreeSet<String>,
    failure: BTreeSet<String>,
    backoff: BackoffPolicy,
    timeout: WaitTimeout,
    not_found_grace: Duration,
}

impl WaitSpec {
    pub fn builder(intent: WaitIntent) -> WaitSpecBuilder {
        WaitSpecBuilder::new(intent)
    }

    pub fn intent(&self) -> WaitIntent {
        self.intent
    }

    pub fn target(&self) -> &BTreeSet<String> {
        &self.target
    }

    pub fn failure(&self) -> &BTreeSet<String> {
        &self.failure
    }

    pub fn is_target(&self, status: &str) -> bool {
        self.target.contains(status)
    }

    pub fn is_failure(&self, status: &str) -> bool {
        self.failure.contains(status)
    }

    pub fn backoff(&self) -> &BackoffPolicy {
        &self.backoff
    }

    pub fn timeout(&self) -> WaitTimeout {
        self.timeout
    }

    /// How long after the start of the wait a NotFound is still transient
    pub fn not_found_grace(&self) -> Duration {
        self.not_found_grace
    }

    /// Copy of this spec with a different timeout
    pub fn with_timeout(mut self, timeout: WaitTimeout) -> Self {
        self.timeout = timeout.normalized();
        self
    }
}

/// Builder for [`WaitSpec`]
#[derive(Debug, Clone)]
pub struct WaitSpecBuilder {
    intent: WaitIntent,
    target: BTreeSet<String>,
    failure: BTreeSet<String>,
    backoff: BackoffPolicy,
    timeout: WaitTimeout,
    not_found_grace: Duration,
}

impl WaitSpecBuilder {
    pub fn new(intent: WaitIntent) -> Self {
        Self {
            intent,
            target: BTreeSet::new(),
            failure: BTreeSet::new(),
            backoff: BackoffPolicy::default(),
            timeout: WaitTimeout::Within(Duration::from_secs(
                converge_common::defaults::DEFAULT_TIMEOUT_SECS,
            )),
            not_found_grace: Duration::ZERO,
        }
    }

    pub fn target<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target.extend(statuses.into_iter().map(Into::into));
        self
    }

    pub fn failure<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failure.extend(statuses.into_iter().map(Into::into));
        self
    }

    pub fn backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.backoff.initial_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.backoff.max_delay = delay;
        self
    }

    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.backoff.multiplier = multiplier;
        self
    }

    pub fn jitter(mut self, jitter: f64) -> Self {
        self.backoff.jitter = jitter;
        self
    }

    pub fn timeout(mut self, timeout: WaitTimeout) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn not_found_grace(mut self, grace: Duration) -> Self {
        self.not_found_grace = grace;
        self
    }

    /// Validate and build the spec
    pub fn build(self) -> Result<WaitSpec, SpecError> {
        if self.target.is_empty() && self.intent != WaitIntent::Delete {
            return Err(SpecError::EmptyTarget(self.intent));
        }

        let overlap: Vec<String> = self.target.intersection(&self.failure).cloned().collect();
        if !overlap.is_empty() {
            return Err(SpecError::OverlappingStatuses { statuses: overlap });
        }

        let BackoffPolicy {
            initial_delay,
            max_delay,
            multiplier,
            jitter,
        } = self.backoff;

        // NaN fails both comparisons
        if !(multiplier > 1.0 && multiplier.is_finite()) {
            return Err(SpecError::InvalidMultiplier(multiplier));
        }
        if !(0.0..=1.0).contains(&jitter) {
            return Err(SpecError::InvalidJitter(jitter));
        }
        if initial_delay.is_zero() {
            return Err(SpecError::ZeroInitialDelay);
        }
        if initial_delay > max_delay {
            return Err(SpecError::DelayOrder {
                initial: initial_delay,
                max: max_delay,
            });
        }

        let timeout = self.timeout.normalized();

        Ok(WaitSpec {
            intent: self.intent,
            target: self.target,
            failure: self.failure,
            backoff: self.backoff,
            timeout,
            not_found_grace: self.not_found_grace,
        })
    }
}
