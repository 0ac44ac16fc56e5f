//! Unique identifier generation
//!
//! Tests that run waits concurrently use these so log lines and assertions
//! can tell the waits apart.

use chrono::Utc;
use converge_common::ResourceIdentity;

/// Generate a unique run ID for test resources.
///
/// Format: `test-{timestamp_ms}-{counter}`. The counter keeps IDs distinct
/// even when tests start in the same millisecond.
///
/// # Example
///
/// ```
/// use converge_test_utils::identity::test_run_id;
///
/// let run_id = test_run_id();
/// assert!(run_id.starts_with("test-"));
/// ```
pub fn test_run_id() -> String {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let ts = Utc::now().timestamp_millis();
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("test-{}-{}", ts, counter)
}

/// Single-part identity `{prefix}-{run id}`
pub fn test_identity(prefix: &str) -> ResourceIdentity {
    ResourceIdentity::single(format!("{prefix}-{}", test_run_id()))
}

/// Two-part identity with a unique child, e.g. a schedule inside `parent`
pub fn test_composite_identity(parent: &str, child_prefix: &str) -> ResourceIdentity {
    let child = format!("{child_prefix}-{}", test_run_id());
    ResourceIdentity::composite([parent.to_string(), child])
        .unwrap_or_else(|e| panic!("invalid test identity: {e}"))
}
