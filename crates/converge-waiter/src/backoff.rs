//! Exponential delay schedule with jitter
//!
//! The schedule starts at the initial delay and multiplies after every
//! unsuccessful poll, capped at the max delay. Jitter only stretches the
//! sleep that is actually taken; the schedule itself stays deterministic.

use backon::{BackoffBuilder, ExponentialBackoff, ExponentialBuilder};
use converge_common::defaults::{
    DEFAULT_INITIAL_DELAY_MS, DEFAULT_JITTER, DEFAULT_MAX_DELAY_MS, DEFAULT_MULTIPLIER,
};
use rand::Rng;
use std::time::Duration;

/// Backoff configuration for one wait.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    /// Delay after the first unsuccessful poll
    pub initial_delay: Duration,
    /// Maximum delay between polls (cap for exponential growth)
    pub max_delay: Duration,
    /// Growth factor applied after each unsuccessful poll, must be > 1
    pub multiplier: f64,
    /// Jitter factor (0.0 - 1.0) to add randomness to delays
    pub jitter: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
            multiplier: DEFAULT_MULTIPLIER,
            jitter: DEFAULT_JITTER,
        }
    }
}

/// Delay schedule produced from a [`BackoffPolicy`].
///
/// Iterating yields the pre-jitter delays, which never decrease and never
/// exceed `max_delay`. Grown delays are rounded to whole milliseconds, the
/// resolution of tokio's timer.
#[derive(Debug)]
pub struct Backoff {
    policy: BackoffPolicy,
    delays: ExponentialBackoff,
    last: Option<Duration>,
}

impl Backoff {
    pub fn new(policy: BackoffPolicy) -> Self {
        let delays = ExponentialBuilder::default()
            .with_min_delay(policy.initial_delay.min(policy.max_delay))
            .with_max_delay(policy.max_delay)
            .with_factor(policy.multiplier as f32)
            .without_max_times()
            .build();
        Self {
            policy,
            delays,
            last: None,
        }
    }

    /// Delay before the next poll, advancing the schedule.
    pub fn next_delay(&mut self) -> Duration {
        let max = self.policy.max_delay;
        let raw = self.delays.next().unwrap_or(max);
        let delay = match self.last {
            None => raw.min(max),
            Some(prev) => round_to_millis(raw).clamp(prev, max),
        };
        self.last = Some(delay);
        delay
    }

    /// Apply this policy's jitter to `base`.
    pub fn jittered(&self, base: Duration) -> Duration {
        jittered_delay(base, self.policy.jitter)
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }
}

fn round_to_millis(d: Duration) -> Duration {
    let millis = (d.as_nanos() + 500_000) / 1_000_000;
    Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX))
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        Some(self.next_delay())
    }
}

/// Add jitter to a duration to prevent thundering herd.
///
/// The result lies in `[base, base * (1 + jitter_factor))`.
pub fn jittered_delay(base: Duration, jitter_factor: f64) -> Duration {
    if jitter_factor <= 0.0 || base.is_zero() {
        return base;
    }
    let jitter = rand::thread_rng().gen_range(0.0..jitter_factor);
    Duration::try_from_secs_f64(base.as_secs_f64() * (1.0 + jitter)).unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn policy(initial_ms: u64, max_ms: u64, multiplier: f64) -> BackoffPolicy {
        BackoffPolicy {
            initial_delay: Duration::from_millis(initial_ms),
            max_delay: Duration::from_millis(max_ms),
            multiplier,
            jitter: 0.0,
        }
    }

    #[test]
    fn test_doubles_until_capped() {
        let delays: Vec<u128> = Backoff::new(policy(100, 1000, 2.0))
            .take(6)
            .map(|d| d.as_millis())
            .collect();
        assert_eq!(delays, vec![100, 200, 400, 800, 1000, 1000]);
    }

    #[test]
    fn test_initial_above_max_is_clamped() {
        let mut backoff = Backoff::new(policy(5000, 1000, 2.0));
        assert_eq!(backoff.next_delay(), Duration::from_millis(1000));
        assert_eq!(backoff.next_delay(), Duration::from_millis(1000));
    }

    #[test]
    fn test_fractional_multiplier() {
        let delays: Vec<Duration> = Backoff::new(policy(1000, 10_000, 1.5)).take(5).collect();
        assert_eq!(
            delays,
            [1000, 1500, 2250, 3375, 5063].map(Duration::from_millis).to_vec()
        );
    }

    #[test]
    fn test_zero_jitter_is_identity() {
        let base = Duration::from_millis(250);
        assert_eq!(jittered_delay(base, 0.0), base);
    }

    proptest! {
        #[test]
        fn delays_non_decreasing_and_bounded(
            initial_ms in 1u64..5_000,
            extra_ms in 0u64..60_000,
            multiplier in 1.01f64..8.0,
        ) {
            let max_ms = initial_ms + extra_ms;
            let delays: Vec<Duration> = Backoff::new(policy(initial_ms, max_ms, multiplier))
                .take(64)
                .collect();
            prop_assert_eq!(delays[0], Duration::from_millis(initial_ms));
            for pair in delays.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }
            for d in &delays {
                prop_assert!(*d <= Duration::from_millis(max_ms));
            }
        }

        #[test]
        fn jitter_stays_within_fraction(base_ms in 1u64..10_000, jitter in 0.01f64..1.0) {
            let base = Duration::from_millis(base_ms);
            let j = jittered_delay(base, jitter);
            prop_assert!(j + Duration::from_nanos(1) >= base);
            prop_assert!(j.as_secs_f64() <= base.as_secs_f64() * (1.0 + jitter) + 1e-9);
        }
    }
}
