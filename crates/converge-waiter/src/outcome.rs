//! Wait results and the waiter's phases

use crate::fetch::FetchError;
use crate::snapshot::StatusSnapshot;
use converge_common::ResourceIdentity;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Terminal result of a wait
pub type WaitOutcome<P> = Result<WaitSuccess<P>, WaitError<P>>;

/// Phases of one wait.
///
/// `Pending → {Polling ⇄ Sleeping} → terminal`. Terminal phases are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPhase {
    Pending,
    Polling,
    Sleeping,
    Succeeded,
    FatalStatus,
    TimedOut,
    NotFound,
    TransportError,
}

impl WaitPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            WaitPhase::Succeeded
                | WaitPhase::FatalStatus
                | WaitPhase::TimedOut
                | WaitPhase::NotFound
                | WaitPhase::TransportError
        )
    }

    /// Whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(self, next: WaitPhase) -> bool {
        use WaitPhase::*;
        match (self, next) {
            (Pending, Polling) => true,
            // Cancellation can be observed before the first poll
            (Pending, TimedOut) => true,
            (Polling, Sleeping) => true,
            (Sleeping, Polling) => true,
            (Sleeping, TimedOut) => true,
            (Polling, next) => next.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for WaitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WaitPhase::Pending => "pending",
            WaitPhase::Polling => "polling",
            WaitPhase::Sleeping => "sleeping",
            WaitPhase::Succeeded => "succeeded",
            WaitPhase::FatalStatus => "fatal_status",
            WaitPhase::TimedOut => "timed_out",
            WaitPhase::NotFound => "not_found",
            WaitPhase::TransportError => "transport_error",
        };
        f.write_str(s)
    }
}

/// Why a wait timed out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutReason {
    /// The spec's timeout elapsed (or its single poll was spent)
    Deadline,
    /// The caller's cancellation token fired
    Cancelled,
}

impl fmt::Display for TimeoutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TimeoutReason::Deadline => "deadline elapsed",
            TimeoutReason::Cancelled => "cancelled",
        })
    }
}

/// Successful end of a wait
#[derive(Debug, Clone, PartialEq)]
pub struct WaitSuccess<P> {
    /// Final snapshot; `None` when a delete wait observed the object gone
    pub snapshot: Option<StatusSnapshot<P>>,
    /// Number of fetch calls made
    pub attempts: u32,
    /// Time from the start of the wait
    pub elapsed: Duration,
}

impl<P> WaitSuccess<P> {
    pub fn status(&self) -> Option<&str> {
        self.snapshot.as_ref().map(StatusSnapshot::status)
    }

    /// Whether success was the object's absence
    pub fn is_absent(&self) -> bool {
        self.snapshot.is_none()
    }
}

fn last_status<P>(last: &Option<StatusSnapshot<P>>) -> &str {
    last.as_ref().map_or("<none>", StatusSnapshot::status)
}

/// Failed end of a wait
#[derive(Debug, Error)]
pub enum WaitError<P> {
    /// Deadline or cancellation before a terminal status was seen
    #[error(
        "timed out waiting for {identity} ({reason}) after {attempts} polls, last status: {}",
        last_status(.last)
    )]
    Timeout {
        identity: ResourceIdentity,
        reason: TimeoutReason,
        attempts: u32,
        elapsed: Duration,
        last: Option<StatusSnapshot<P>>,
    },

    /// A failure-set status was observed
    #[error("{identity} reached failure status '{}' after {attempts} polls", .snapshot.status())]
    FatalStatus {
        identity: ResourceIdentity,
        attempts: u32,
        snapshot: StatusSnapshot<P>,
    },

    /// The object stayed absent past the grace window
    #[error("{identity} not found after {elapsed:?} ({attempts} polls): {message}")]
    NotFound {
        identity: ResourceIdentity,
        attempts: u32,
        elapsed: Duration,
        message: String,
    },

    /// The fetch failed for a reason other than absence
    #[error("fetching status of {identity} failed after {attempts} polls")]
    Transport {
        identity: ResourceIdentity,
        attempts: u32,
        #[source]
        source: FetchError,
    },
}

impl<P> WaitError<P> {
    pub fn identity(&self) -> &ResourceIdentity {
        match self {
            WaitError::Timeout { identity, .. }
            | WaitError::FatalStatus { identity, .. }
            | WaitError::NotFound { identity, .. }
            | WaitError::Transport { identity, .. } => identity,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            WaitError::Timeout { attempts, .. }
            | WaitError::FatalStatus { attempts, .. }
            | WaitError::NotFound { attempts, .. }
            | WaitError::Transport { attempts, .. } => *attempts,
        }
    }

    /// Last snapshot observed before the failure, for diagnostics
    pub fn last_snapshot(&self) -> Option<&StatusSnapshot<P>> {
        match self {
            WaitError::Timeout { last, .. } => last.as_ref(),
            WaitError::FatalStatus { snapshot, .. } => Some(snapshot),
            WaitError::NotFound { .. } | WaitError::Transport { .. } => None,
        }
    }

    /// The terminal phase this failure corresponds to
    pub fn phase(&self) -> WaitPhase {
        match self {
            WaitError::Timeout { .. } => WaitPhase::TimedOut,
            WaitError::FatalStatus { .. } => WaitPhase::FatalStatus,
            WaitError::NotFound { .. } => WaitPhase::NotFound,
            WaitError::Transport { .. } => WaitPhase::TransportError,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::Timeout { .. })
    }

    /// Check if retrying the whole wait may help
    pub fn is_retryable(&self) -> bool {
        matches!(self, WaitError::Transport { source, .. } if source.is_retryable())
    }
}
