//! # Backoff between retry attempts.
//!
//! [`BackoffPolicy`] computes the sleep inserted after a failed attempt. The delay after
//! attempt `n` (1-based) is `first × factor^(n-1)`, clamped to `max`, then jittered.
//!
//! The default (`first = 2s`, `factor = 2.0`, no cap, no jitter) yields `2^n` seconds
//! after attempt `n`: 2s, 4s, 8s, ... Tests shrink `first` to keep the same shape at
//! millisecond scale.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use tasktide::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(20),
//!     max: Duration::from_secs(1),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.delay_after(1), Duration::from_millis(20));
//! assert_eq!(backoff.delay_after(2), Duration::from_millis(40));
//! assert_eq!(backoff.delay_after(3), Duration::from_millis(80));
//! assert_eq!(backoff.delay_after(20), Duration::from_secs(1));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Retry backoff policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay after the first failed attempt.
    pub first: Duration,
    /// Upper bound for any computed delay.
    pub max: Duration,
    /// Multiplicative growth per attempt (`>= 1.0` keeps delays non-decreasing).
    pub factor: f64,
    /// Randomization applied to the clamped delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// `2^attempt` seconds: `first = 2s`, `factor = 2.0`, `max = Duration::MAX`, no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_secs(2),
            max: Duration::MAX,
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Backoff scaled to `unit`: the delay after attempt `n` is `unit × 2^n`.
    ///
    /// `BackoffPolicy::exponential(Duration::from_secs(1))` equals the default.
    pub fn exponential(unit: Duration) -> Self {
        Self {
            first: unit.saturating_mul(2),
            ..Self::default()
        }
    }

    /// Computes the delay to wait after the given failed attempt (1-based).
    ///
    /// Attempt `0` is treated like attempt `1`. The base delay never feeds back into the
    /// next computation, so jitter cannot shrink later delays.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !secs.is_finite() || secs < 0.0 || secs > self.max.as_secs_f64() {
            self.max
        } else {
            Duration::try_from_secs_f64(secs)
                .unwrap_or(self.max)
                .min(self.max)
        };

        self.jitter.apply(base)
    }
}
