//! converge-waiter - Eventual-consistency waiter for remote resource state
//!
//! Polls a remote object's status through an injected fetch operation until
//! it reaches a target status, a failure status, the wait's deadline, or a
//! transport error. One parameterised waiter replaces per-resource polling
//! loops; the per-resource differences live in [`WaitSpec`] data.
//!
//! ## Modules
//!
//! - [`backoff`]: Exponential delay schedule with jitter
//! - [`error`]: AWS error code classification
//! - [`fetch`]: The fetch contract and "find by key" helpers
//! - [`logging`]: Tracing subscriber setup for host processes
//! - [`outcome`]: Wait results and the waiter's phases
//! - [`retry`]: Opt-in retry of a whole wait on throttling
//! - [`snapshot`]: The result of one poll
//! - [`spec`]: Validated wait configuration
//! - [`waiter`]: The polling loop

pub mod backoff;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod outcome;
pub mod retry;
pub mod snapshot;
pub mod spec;
pub mod waiter;

pub use converge_common::ResourceIdentity;

pub use backoff::{Backoff, BackoffPolicy};
pub use error::{classify_anyhow_error, classify_aws_error, classify_sdk_error};
pub use fetch::{FetchError, StatusFetcher, require_found, require_found_with};
pub use outcome::{TimeoutReason, WaitError, WaitOutcome, WaitPhase, WaitSuccess};
pub use retry::{RetryPolicy, retry_wait};
pub use snapshot::StatusSnapshot;
pub use spec::{SpecError, WaitIntent, WaitSpec, WaitSpecBuilder, WaitTimeout};
pub use waiter::{StateWaiter, wait_for_state};
