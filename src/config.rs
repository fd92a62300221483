//! # Scheduler configuration.
//!
//! [`SchedulerConfig`] centralizes engine-wide settings. Like [`TaskConfig`](crate::TaskConfig),
//! zero values are sentinels; read them through the accessors rather than the raw fields.
//!
//! ## Sentinel values
//! - `max_workers = 0` → host logical CPU count
//! - `default_retry_limit = 0` → 3 attempts

use std::num::NonZeroUsize;

use crate::policies::BackoffPolicy;

/// Attempts used when neither the task nor the scheduler specify a limit.
pub const DEFAULT_RETRY_LIMIT: u32 = 3;

/// Engine-wide configuration.
///
/// ## Field semantics
/// - `max_workers`: concurrent `execute` calls allowed (`0` = logical CPUs)
/// - `default_retry_limit`: attempts per run when `TaskConfig::retry_limit` is `0`
/// - `backoff`: delay between failed attempts
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `retry_panics`: whether a panicking attempt is retried like an ordinary failure
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Size of the worker pool (admission gate).
    pub max_workers: usize,

    /// Default attempt limit per scheduled run.
    pub default_retry_limit: u32,

    /// Backoff between attempts of a failing task.
    pub backoff: BackoffPolicy,

    /// Capacity of the event bus broadcast channel.
    pub bus_capacity: usize,

    /// Retry attempts that panicked.
    ///
    /// A panic may leave state the task closes over half-updated; set to `false` to
    /// treat a panic as a permanent failure of the run instead.
    pub retry_panics: bool,
}

impl SchedulerConfig {
    /// Builds a config with the two knobs the engine is usually constructed with.
    pub fn new(max_workers: usize, default_retry_limit: u32) -> Self {
        Self {
            max_workers,
            default_retry_limit,
            ..Self::default()
        }
    }

    /// Effective worker pool size (never zero).
    #[inline]
    pub fn worker_limit(&self) -> usize {
        if self.max_workers == 0 {
            std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        } else {
            self.max_workers
        }
    }

    /// Effective default attempt limit (never zero).
    #[inline]
    pub fn retry_limit(&self) -> u32 {
        if self.default_retry_limit == 0 {
            DEFAULT_RETRY_LIMIT
        } else {
            self.default_retry_limit
        }
    }

    /// Bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for SchedulerConfig {
    /// - `max_workers = 0` (logical CPUs)
    /// - `default_retry_limit = 3`
    /// - `backoff = BackoffPolicy::default()` (`2^attempt` seconds)
    /// - `bus_capacity = 1024`
    /// - `retry_panics = true`
    fn default() -> Self {
        Self {
            max_workers: 0,
            default_retry_limit: DEFAULT_RETRY_LIMIT,
            backoff: BackoffPolicy::default(),
            bus_capacity: 1024,
            retry_panics: true,
        }
    }
}
