//! # Per-task execution policy.
//!
//! [`TaskConfig`] is passed alongside a task to each `schedule_*` call. Zero values are
//! sentinels that defer to the scheduler:
//! - `retry_limit = 0` → the scheduler's default retry limit;
//! - `timeout = 0s` → no per-attempt timeout.
//!
//! `wait_for_previous` and `interval_after_finish` only matter for
//! [`Scheduler::schedule_periodic`](crate::Scheduler::schedule_periodic).
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tasktide::TaskConfig;
//!
//! let cfg = TaskConfig::default()
//!     .with_retry_limit(5)
//!     .with_timeout(Duration::from_secs(30))
//!     .with_wait_for_previous(true);
//!
//! assert_eq!(cfg.retry_limit_or(3), 5);
//! assert_eq!(cfg.timeout(), Some(Duration::from_secs(30)));
//! assert_eq!(TaskConfig::default().timeout(), None);
//! ```

use std::time::Duration;

/// Execution policy of one scheduled task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskConfig {
    /// Maximum number of attempts (`0` = scheduler default).
    pub retry_limit: u32,
    /// Per-attempt timeout (`0s` = unbounded).
    pub timeout: Duration,
    /// Ticker mode only: drop a tick while the previous run is still executing.
    pub wait_for_previous: bool,
    /// Use sequential periodic mode: wait the interval after each run finishes.
    pub interval_after_finish: bool,
}

impl TaskConfig {
    /// Returns the effective attempt limit, falling back to `default` for `0`.
    #[inline]
    pub fn retry_limit_or(&self, default: u32) -> u32 {
        if self.retry_limit == 0 {
            default
        } else {
            self.retry_limit
        }
    }

    /// Returns the per-attempt timeout as an `Option`.
    #[inline]
    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }

    /// Returns a config with the given attempt limit.
    pub fn with_retry_limit(mut self, limit: u32) -> Self {
        self.retry_limit = limit;
        self
    }

    /// Returns a config with the given per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns a config that skips overlapping ticks.
    pub fn with_wait_for_previous(mut self, wait: bool) -> Self {
        self.wait_for_previous = wait;
        self
    }

    /// Returns a config that selects sequential periodic mode.
    pub fn with_interval_after_finish(mut self, after_finish: bool) -> Self {
        self.interval_after_finish = after_finish;
        self
    }
}
