//! The result of one poll

use crate::fetch::FetchError;
use std::fmt;

/// Status label plus the full describe response for one poll.
///
/// Snapshots are immutable values; the waiter only keeps the latest one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot<P = ()> {
    status: String,
    payload: P,
}

impl<P> StatusSnapshot<P> {
    pub fn new(status: impl Into<String>, payload: P) -> Self {
        Self {
            status: status.into(),
            payload,
        }
    }

    /// Build a snapshot from a describe response whose status field may be absent.
    ///
    /// A response without a status is treated as an empty result for `request`.
    pub fn from_parts<S, R>(status: Option<S>, payload: P, request: &R) -> Result<Self, FetchError>
    where
        S: Into<String>,
        R: fmt::Debug,
    {
        match status {
            Some(status) => Ok(Self::new(status, payload)),
            None => Err(FetchError::empty_result(request)),
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn into_payload(self) -> P {
        self.payload
    }

    pub fn map<U>(self, f: impl FnOnce(P) -> U) -> StatusSnapshot<U> {
        StatusSnapshot {
            status: self.status,
            payload: f(self.payload),
        }
    }
}

impl StatusSnapshot<()> {
    /// Snapshot with no payload
    pub fn status_only(status: impl Into<String>) -> Self {
        Self::new(status, ())
    }
}
