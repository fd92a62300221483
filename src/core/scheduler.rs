//! # Scheduler: scheduling strategies and epoch lifecycle.
//!
//! [`Scheduler`] exposes four entry points, all of which funnel into the executor's
//! retry/backoff loop and are tracked by the current epoch:
//!
//! ```text
//! schedule_now(task)               ─► executor.run()                 (awaited in place)
//! schedule_async(task)             ─► spawn ─► executor.run()
//! schedule_after(task, delay)      ─► spawn ─► sleep(delay) ─► executor.run()
//! schedule_periodic(task, every)   ─► spawn ─► ticker loop   ─► spawn ─► executor.run()   (per tick)
//!                                            └ sequential loop ─► executor.run() ─► sleep(every) ─► ...
//!
//! reset() ─► cancel epoch ─► wait for outstanding == 0 ─► install epoch + 1
//! ```
//!
//! Scheduling loops are not bounded by the worker pool; only `execute` is.
//! Nothing is returned to the caller: outcomes go to `tracing` and to the event bus.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use tasktide::{Scheduler, TaskConfig, TaskError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let scheduler = Scheduler::new(4, 3);
//!
//!     let sync = scheduler.tasks().task("sync-orders", |ctx: CancellationToken| async move {
//!         if ctx.is_cancelled() {
//!             return Err(TaskError::Canceled);
//!         }
//!         Ok(())
//!     });
//!
//!     let cfg = TaskConfig::default()
//!         .with_timeout(Duration::from_secs(10))
//!         .with_wait_for_previous(true);
//!     scheduler.schedule_periodic(sync.clone(), Duration::from_secs(60), Some(cfg));
//!     scheduler.schedule_now(sync, None).await;
//!
//!     scheduler.reset().await;
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::config::SchedulerConfig;
use crate::core::builder::SchedulerBuilder;
use crate::core::epoch::Epoch;
use crate::core::executor::Executor;
use crate::events::{Event, EventKind};
use crate::tasks::{TaskConfig, TaskFactory, TaskRef};

/// Task scheduling engine. Cheap to clone; clones share the same engine.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

pub(crate) struct Inner {
    cfg: SchedulerConfig,
    executor: Executor,
    epoch: RwLock<Arc<Epoch>>,
    resetting: AtomicBool,
    tasks: TaskFactory,
    listener: Option<JoinHandle<()>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

/// Clears the reset flag on every exit path of `reset()`.
struct ResetGuard<'a>(&'a AtomicBool);

impl Drop for ResetGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Clears the "previous run executing" flag of a ticker job.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Scheduler {
    /// Creates a scheduler with `max_workers` execution slots and a default retry limit.
    ///
    /// `max_workers = 0` uses the host's logical CPU count; `default_retry_limit = 0`
    /// is coerced to 3.
    pub fn new(max_workers: usize, default_retry_limit: u32) -> Self {
        SchedulerBuilder::new(SchedulerConfig::new(max_workers, default_retry_limit)).build()
    }

    /// Returns a builder for full configuration (backoff, subscribers, shared id space).
    pub fn builder(cfg: SchedulerConfig) -> SchedulerBuilder {
        SchedulerBuilder::new(cfg)
    }

    pub(crate) fn from_parts(
        cfg: SchedulerConfig,
        executor: Executor,
        tasks: TaskFactory,
        listener: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                cfg,
                executor,
                epoch: RwLock::new(Arc::new(Epoch::new(1))),
                resetting: AtomicBool::new(false),
                tasks,
                listener,
            }),
        }
    }

    /// Runs `task` (with retries) and returns once it reaches a terminal state.
    ///
    /// The run is tracked by the current epoch, so a concurrent [`reset`](Self::reset)
    /// waits for it.
    pub async fn schedule_now(&self, task: TaskRef, cfg: Option<TaskConfig>) {
        let epoch = self.current_epoch();
        let cfg = cfg.unwrap_or_default();
        epoch
            .tracker()
            .track_future(self.inner.executor.run(task.as_ref(), &cfg, &epoch))
            .await;
    }

    /// Spawns a tracked run of `task` and returns immediately.
    pub fn schedule_async(&self, task: TaskRef, cfg: Option<TaskConfig>) {
        let epoch = self.current_epoch();
        let inner = Arc::clone(&self.inner);
        let cfg = cfg.unwrap_or_default();

        let tracker = epoch.tracker().clone();
        tracker.spawn(async move {
            inner.executor.run(task.as_ref(), &cfg, &epoch).await;
        });
    }

    /// Spawns a tracked unit that waits `delay`, then runs `task`.
    ///
    /// If the epoch is cancelled during the wait, the task never runs.
    pub fn schedule_after(&self, task: TaskRef, delay: Duration, cfg: Option<TaskConfig>) {
        let epoch = self.current_epoch();
        let inner = Arc::clone(&self.inner);
        let cfg = cfg.unwrap_or_default();

        let tracker = epoch.tracker().clone();
        tracker.spawn(async move {
            let sleep = time::sleep(delay);
            tokio::pin!(sleep);
            tokio::select! {
                biased;
                _ = epoch.token().cancelled() => {
                    info!(task_id = task.id(), task = task.name(), delay = ?delay, "delayed task skipped due to shutdown");
                    inner.executor.publish(task.as_ref(), EventKind::TaskSkipped, |ev| {
                        ev.with_epoch(epoch.id()).with_reason("shutdown")
                    });
                    return;
                }
                _ = &mut sleep => {}
            }
            inner.executor.run(task.as_ref(), &cfg, &epoch).await;
        });
    }

    /// Spawns a tracked loop that runs `task` every `interval` until the epoch ends.
    ///
    /// - `cfg.interval_after_finish = false` (default): fixed-rate ticker. The first run
    ///   starts one `interval` after the call. With `cfg.wait_for_previous` a tick that
    ///   arrives while the previous run is executing is dropped; otherwise runs may overlap.
    /// - `cfg.interval_after_finish = true`: sequential. Runs immediately, then waits
    ///   `interval` after each run finishes.
    ///
    /// A zero `interval` is rejected and nothing is scheduled, as is a ticker `interval`
    /// too large to place two ticks on the clock.
    pub fn schedule_periodic(&self, task: TaskRef, interval: Duration, cfg: Option<TaskConfig>) {
        let cfg = cfg.unwrap_or_default();
        let epoch = self.current_epoch();
        if interval.is_zero() {
            error!(task_id = task.id(), task = task.name(), "periodic task rejected: zero interval");
            self.inner.executor.publish(task.as_ref(), EventKind::TaskSkipped, |ev| {
                ev.with_epoch(epoch.id()).with_reason("zero_interval")
            });
            return;
        }

        let inner = Arc::clone(&self.inner);
        let tracker = epoch.tracker().clone();

        if cfg.interval_after_finish {
            tracker.spawn(Inner::sequential_loop(inner, task, interval, cfg, epoch));
            return;
        }

        // The second tick lands at now + 2 * interval.
        let Some(start) = Instant::now()
            .checked_add(interval)
            .filter(|start| start.checked_add(interval).is_some())
        else {
            error!(task_id = task.id(), task = task.name(), interval = ?interval, "periodic task rejected: interval overflows the clock");
            self.inner.executor.publish(task.as_ref(), EventKind::TaskSkipped, |ev| {
                ev.with_epoch(epoch.id()).with_reason("interval_overflow")
            });
            return;
        };
        tracker.spawn(Inner::ticker_loop(inner, task, start, interval, cfg, epoch));
    }

    /// Cancels all in-flight and pending work, waits for it to stop, and re-arms the
    /// scheduler with a fresh epoch.
    ///
    /// Only one reset runs at a time; concurrent calls return immediately. Work
    /// scheduled while a reset is draining belongs to the retiring epoch and is skipped.
    /// If the returned future is dropped before completion, the engine stays cancelled
    /// until `reset` is called again.
    pub async fn reset(&self) {
        if self
            .inner
            .resetting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("reset already in progress");
            return;
        }
        let _guard = ResetGuard(&self.inner.resetting);

        let old = self.current_epoch();
        info!(epoch = old.id(), outstanding = old.outstanding(), "reset requested; cancelling epoch");
        self.inner
            .executor
            .bus()
            .publish(Event::new(EventKind::ResetRequested).with_epoch(old.id()));

        let started = Instant::now();
        old.retire().await;

        let fresh = Arc::new(Epoch::new(old.id() + 1));
        let id = fresh.id();
        *self.inner.epoch.write() = fresh;

        let elapsed = started.elapsed();
        info!(epoch = id, elapsed = ?elapsed, "reset completed");
        self.inner.executor.bus().publish(
            Event::new(EventKind::ResetCompleted)
                .with_epoch(id)
                .with_elapsed(elapsed),
        );
    }

    /// Factory that allocates ids for this scheduler's tasks.
    pub fn tasks(&self) -> &TaskFactory {
        &self.inner.tasks
    }

    /// Current epoch number (starts at 1, incremented by each completed reset).
    pub fn epoch(&self) -> u64 {
        self.inner.epoch.read().id()
    }

    /// Size of the worker pool.
    pub fn max_workers(&self) -> usize {
        self.inner.executor.pool().size()
    }

    /// Free execution slots right now.
    pub fn available_workers(&self) -> usize {
        self.inner.executor.pool().available()
    }

    /// Scheduling units (runs and loops) tracked by the current epoch.
    pub fn outstanding(&self) -> usize {
        self.inner.epoch.read().outstanding()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.inner.cfg
    }

    /// Receives every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.executor.bus().subscribe()
    }

    fn current_epoch(&self) -> Arc<Epoch> {
        Arc::clone(&self.inner.epoch.read())
    }
}

impl Inner {
    async fn ticker_loop(
        self: Arc<Self>,
        task: TaskRef,
        start: Instant,
        interval: Duration,
        cfg: TaskConfig,
        epoch: Arc<Epoch>,
    ) {
        let token = epoch.token().clone();
        let running = Arc::new(AtomicBool::new(false));
        let mut ticker = time::interval_at(start, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        debug!(task_id = task.id(), task = task.name(), interval = ?interval, "ticker loop started");
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let guard = if cfg.wait_for_previous {
                if running
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_err()
                {
                    info!(task_id = task.id(), task = task.name(), "tick skipped; previous run still executing");
                    self.executor.publish(task.as_ref(), EventKind::TickSkipped, |ev| {
                        ev.with_epoch(epoch.id()).with_reason("previous_running")
                    });
                    continue;
                }
                Some(RunningGuard(Arc::clone(&running)))
            } else {
                None
            };

            let me = Arc::clone(&self);
            let task = Arc::clone(&task);
            let run_epoch = Arc::clone(&epoch);
            epoch.tracker().spawn(async move {
                let _guard = guard;
                me.executor.run(task.as_ref(), &cfg, &run_epoch).await;
            });
        }
        debug!(task_id = task.id(), task = task.name(), "ticker loop stopped");
    }

    async fn sequential_loop(
        self: Arc<Self>,
        task: TaskRef,
        interval: Duration,
        cfg: TaskConfig,
        epoch: Arc<Epoch>,
    ) {
        let token = epoch.token().clone();

        debug!(task_id = task.id(), task = task.name(), interval = ?interval, "sequential loop started");
        while !token.is_cancelled() {
            self.executor.run(task.as_ref(), &cfg, &epoch).await;

            let pause = time::sleep(interval);
            tokio::pin!(pause);
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = &mut pause => {}
            }
        }
        debug!(task_id = task.id(), task = task.name(), "sequential loop stopped");
    }
}
