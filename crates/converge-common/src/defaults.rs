//! Default wait configuration values
//!
//! These constants keep built-in presets and file-based configuration in
//! agreement about what an omitted field means.

/// Default delay before the second poll, in milliseconds
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 500;

/// Default cap on the delay between polls, in milliseconds (10 seconds)
pub const DEFAULT_MAX_DELAY_MS: u64 = 10_000;

/// Default backoff multiplier applied after each unsuccessful poll
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Default jitter fraction applied to each sleep
pub const DEFAULT_JITTER: f64 = 0.25;

/// Default overall timeout in seconds for specs built in code (5 minutes).
///
/// Configuration entries without `timeout_secs` wait until cancelled instead.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Default NotFound grace window in seconds.
///
/// Zero: a NotFound is definitive unless a preset says otherwise.
pub const DEFAULT_NOT_FOUND_GRACE_SECS: u64 = 0;

/// Timeout for waits on freshly created, not yet readable resources (1 minute)
pub const PROPAGATION_TIMEOUT_SECS: u64 = 60;

// Serde default functions for struct field defaults

/// Returns the default initial delay
pub fn default_initial_delay_ms() -> u64 {
    DEFAULT_INITIAL_DELAY_MS
}

/// Returns the default max delay
pub fn default_max_delay_ms() -> u64 {
    DEFAULT_MAX_DELAY_MS
}

/// Returns the default multiplier
pub fn default_multiplier() -> f64 {
    DEFAULT_MULTIPLIER
}

/// Returns the default jitter fraction
pub fn default_jitter() -> f64 {
    DEFAULT_JITTER
}

/// Returns the default grace window
pub fn default_not_found_grace_secs() -> u64 {
    DEFAULT_NOT_FOUND_GRACE_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_defaults_are_ordered() {
        assert!(DEFAULT_INITIAL_DELAY_MS > 0);
        assert!(DEFAULT_INITIAL_DELAY_MS <= DEFAULT_MAX_DELAY_MS);
    }

    #[test]
    fn test_multiplier_and_jitter_in_range() {
        assert!(default_multiplier() > 1.0);
        assert!((0.0..=1.0).contains(&default_jitter()));
    }
}
