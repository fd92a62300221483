//! # Runtime events emitted by the scheduler.
//!
//! [`EventKind`] classifies what happened; [`Event`] carries the metadata. Every
//! terminal state of a scheduled unit maps onto exactly one kind:
//!
//! ```text
//! Pending ─► TaskSkipped                       (shutdown / cancelled before start)
//! Pending ─► TaskStarting ─► TaskSucceeded
//!                         ─► TaskCanceled
//!                         ─► TimeoutHit
//!                         ─► TaskFailed ─► BackoffScheduled ─► TaskStarting ...
//!                                       ─► TaskExhausted
//! tick    ─► TickSkipped                       (previous run still executing)
//! ```
//!
//! ## Ordering
//! The [`Bus`](crate::events::Bus) stamps each event with a sequence number that
//! increases monotonically per scheduler. Use `seq` to restore publish order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tasktide::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_task(7, "sync-orders")
//!     .with_reason("boom")
//!     .with_attempt(2)
//!     .with_delay(Duration::from_secs(4));
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task_id, Some(7));
//! assert_eq!(ev.task.as_deref(), Some("sync-orders"));
//! assert_eq!(ev.delay_ms, Some(4000));
//! ```

use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // === Task lifecycle ===
    /// Run abandoned before executing.
    ///
    /// Sets `task`, `task_id`, `reason` (`shutdown`, `cancelled_before_start`,
    /// `zero_interval`), `attempt` when an attempt was about to start.
    TaskSkipped,

    /// Slot acquired; attempt is about to execute.
    ///
    /// Sets `task`, `task_id`, `attempt` (1-based).
    TaskStarting,

    /// Attempt returned `Ok`.
    ///
    /// Sets `task`, `task_id`, `attempt`, `elapsed_ms`.
    TaskSucceeded,

    /// Attempt stopped because the epoch was cancelled.
    ///
    /// Sets `task`, `task_id`, `attempt`, `elapsed_ms`.
    TaskCanceled,

    /// Attempt exceeded its timeout. Not retried.
    ///
    /// Sets `task`, `task_id`, `attempt`, `timeout_ms`.
    TimeoutHit,

    /// Attempt failed.
    ///
    /// Sets `task`, `task_id`, `attempt`, `reason`, `elapsed_ms`.
    TaskFailed,

    /// Next attempt scheduled after a failure.
    ///
    /// Sets `task`, `task_id`, `attempt` (the failed one), `delay_ms`, `reason`.
    BackoffScheduled,

    /// No attempts left (or the error was fatal); the run is permanently failed.
    ///
    /// Sets `task`, `task_id`, `attempt`, `reason`.
    TaskExhausted,

    /// Periodic tick dropped because the previous run is still executing.
    ///
    /// Sets `task`, `task_id`, `reason` (`previous_running`).
    TickSkipped,

    // === Lifecycle ===
    /// `reset()` started; the current epoch is being cancelled.
    ///
    /// Sets `epoch` (the retiring one).
    ResetRequested,

    /// `reset()` finished draining; a fresh epoch is installed.
    ///
    /// Sets `epoch` (the new one), `elapsed_ms` (drain time).
    ResetCompleted,

    // === Subscribers ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets `task` (subscriber name), `reason`.
    SubscriberOverflow,

    /// Subscriber panicked while handling an event.
    ///
    /// Sets `task` (subscriber name), `reason` (panic message).
    SubscriberPanicked,
}

/// Runtime event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Monotonic per-bus sequence number (assigned on publish).
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Task id, if applicable.
    pub task_id: Option<u64>,
    /// Task name (or subscriber name for subscriber events).
    pub task: Option<Arc<str>>,
    /// Attempt number (starting from 1).
    pub attempt: Option<u32>,
    /// Epoch the event belongs to.
    pub epoch: Option<u64>,
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Backoff delay in milliseconds.
    pub delay_ms: Option<u64>,
    /// Attempt duration in milliseconds.
    pub elapsed_ms: Option<u64>,
    /// Human-readable reason (errors, skip causes, panic payloads).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates an event of the given kind stamped with the current time.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: 0,
            at: SystemTime::now(),
            kind,
            task_id: None,
            task: None,
            attempt: None,
            epoch: None,
            timeout_ms: None,
            delay_ms: None,
            elapsed_ms: None,
            reason: None,
        }
    }

    /// Attaches task id and name.
    #[inline]
    pub fn with_task(mut self, id: u64, name: impl Into<Arc<str>>) -> Self {
        self.task_id = Some(id);
        self.task = Some(name.into());
        self
    }

    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    #[inline]
    pub fn with_epoch(mut self, epoch: u64) -> Self {
        self.epoch = Some(epoch);
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(as_ms(d));
        self
    }

    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(as_ms(d));
        self
    }

    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        self.elapsed_ms = Some(as_ms(d));
        self
    }

    /// Creates a subscriber overflow event.
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow).with_reason(reason);
        ev.task = Some(subscriber.into());
        ev
    }

    /// Creates a subscriber panic event.
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::SubscriberPanicked).with_reason(info);
        ev.task = Some(subscriber.into());
        ev
    }

    /// True for events produced by the subscriber machinery itself.
    #[inline]
    pub fn is_subscriber_event(&self) -> bool {
        matches!(
            self.kind,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        )
    }
}

fn as_ms(d: Duration) -> u64 {
    d.as_millis().min(u128::from(u64::MAX)) as u64
}
