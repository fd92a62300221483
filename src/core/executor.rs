//! # Executor: one scheduled run with admission, retries and backoff.
//!
//! Every `schedule_*` strategy funnels into [`Executor::run`].
//!
//! ```text
//! loop attempt = 1..=limit {
//!   ├─► epoch cancelled?            → TaskSkipped(cancelled_before_start), exit
//!   ├─► acquire pool slot           → TaskSkipped(shutdown) if epoch cancels first
//!   ├─► publish TaskStarting
//!   ├─► run_once(task, epoch, timeout)          (slot released right after)
//!   │       ├─ Succeeded ─► TaskSucceeded, exit
//!   │       ├─ Canceled  ─► TaskCanceled, exit
//!   │       ├─ TimedOut  ─► TimeoutHit, exit          (no retry)
//!   │       ├─ Fatal     ─► TaskFailed + TaskExhausted, exit
//!   │       └─ Fail / Panicked:
//!   │             ├─ publish TaskFailed
//!   │             ├─ last attempt? ─► TaskExhausted, exit
//!   │             ├─ publish BackoffScheduled{ delay = backoff.delay_after(attempt) }
//!   │             └─ sleep(delay), aborted early by epoch cancellation
//! }
//! ```
//!
//! ## Rules
//! - Attempts of one run are **sequential**.
//! - The pool slot is held only while `execute` runs, never during backoff.
//! - Outcomes are reported through `tracing` and the event [`Bus`]; nothing is
//!   returned to the code that scheduled the task.

use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::core::epoch::Epoch;
use crate::core::pool::WorkerPool;
use crate::core::runner::{AttemptOutcome, run_once};
use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind};
use crate::policies::BackoffPolicy;
use crate::tasks::{Task, TaskConfig};

/// Terminal state of one scheduled run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunOutcome {
    Succeeded,
    Skipped,
    Canceled,
    TimedOut,
    Exhausted,
}

/// Shared execution machinery: pool, backoff and event publishing.
#[derive(Clone, Debug)]
pub(crate) struct Executor {
    pool: WorkerPool,
    bus: Bus,
    backoff: BackoffPolicy,
    default_retry_limit: u32,
    retry_panics: bool,
}

impl Executor {
    pub(crate) fn new(
        pool: WorkerPool,
        bus: Bus,
        backoff: BackoffPolicy,
        default_retry_limit: u32,
        retry_panics: bool,
    ) -> Self {
        Self {
            pool,
            bus,
            backoff,
            default_retry_limit: default_retry_limit.max(1),
            retry_panics,
        }
    }

    pub(crate) fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Runs `task` to a terminal state within `epoch`.
    pub(crate) async fn run<T: Task + ?Sized>(
        &self,
        task: &T,
        cfg: &TaskConfig,
        epoch: &Epoch,
    ) -> RunOutcome {
        let limit = cfg.retry_limit_or(self.default_retry_limit);
        let token = epoch.token();
        let (task_id, name) = (task.id(), task.name());
        let epoch_id = epoch.id();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            if token.is_cancelled() {
                info!(task_id, task = name, attempt, epoch = epoch_id, "task cancelled before start");
                self.publish_attempt(task, epoch_id, attempt, EventKind::TaskSkipped, |ev| {
                    ev.with_reason("cancelled_before_start")
                });
                return RunOutcome::Skipped;
            }

            let outcome = {
                let Some(_permit) = self.pool.acquire(token).await else {
                    info!(task_id, task = name, attempt, epoch = epoch_id, "task skipped due to shutdown");
                    self.publish_attempt(task, epoch_id, attempt, EventKind::TaskSkipped, |ev| {
                        ev.with_reason("shutdown")
                    });
                    return RunOutcome::Skipped;
                };

                self.publish_attempt(task, epoch_id, attempt, EventKind::TaskStarting, |ev| ev);
                let started = Instant::now();
                let outcome = run_once(task, token, cfg.timeout()).await;
                (outcome, started.elapsed())
            };

            let (err, elapsed) = match outcome {
                (AttemptOutcome::Succeeded, elapsed) => {
                    info!(task_id, task = name, attempt, elapsed = ?elapsed, "task completed");
                    self.publish_attempt(task, epoch_id, attempt, EventKind::TaskSucceeded, |ev| {
                        ev.with_elapsed(elapsed)
                    });
                    return RunOutcome::Succeeded;
                }
                (AttemptOutcome::Canceled, elapsed) => {
                    info!(task_id, task = name, attempt, elapsed = ?elapsed, "task cancelled");
                    self.publish_attempt(task, epoch_id, attempt, EventKind::TaskCanceled, |ev| {
                        ev.with_elapsed(elapsed)
                    });
                    return RunOutcome::Canceled;
                }
                (AttemptOutcome::TimedOut(timeout), _) => {
                    error!(task_id, task = name, attempt, timeout = ?timeout, "task timed out");
                    self.publish_attempt(task, epoch_id, attempt, EventKind::TimeoutHit, |ev| {
                        ev.with_timeout(timeout)
                    });
                    return RunOutcome::TimedOut;
                }
                (AttemptOutcome::Panicked(msg), elapsed) => {
                    let err = TaskError::fail(format!("panic: {msg}"));
                    if self.retry_panics {
                        (err, elapsed)
                    } else {
                        self.publish_failed(task, epoch_id, attempt, &err, elapsed);
                        return self.exhaust(task, epoch_id, attempt, &err);
                    }
                }
                (AttemptOutcome::Failed(err), elapsed) if !err.is_retryable() => {
                    self.publish_failed(task, epoch_id, attempt, &err, elapsed);
                    return self.exhaust(task, epoch_id, attempt, &err);
                }
                (AttemptOutcome::Failed(err), elapsed) => (err, elapsed),
            };

            warn!(task_id, task = name, attempt, limit, error = %err, "task attempt failed");
            self.publish_failed(task, epoch_id, attempt, &err, elapsed);

            if attempt >= limit {
                return self.exhaust(task, epoch_id, attempt, &err);
            }

            let delay = self.backoff.delay_after(attempt);
            debug!(task_id, task = name, attempt, delay = ?delay, "retrying after backoff");
            self.publish_attempt(task, epoch_id, attempt, EventKind::BackoffScheduled, |ev| {
                ev.with_delay(delay).with_reason(err.to_string())
            });

            // A cancelled wait falls through to the cancellation check at the top.
            self.backoff_sleep(delay, token).await;
        }
    }

    async fn backoff_sleep(&self, delay: Duration, token: &CancellationToken) {
        let sleep = time::sleep(delay);
        tokio::pin!(sleep);
        tokio::select! {
            biased;
            _ = token.cancelled() => {}
            _ = &mut sleep => {}
        }
    }

    fn exhaust<T: Task + ?Sized>(
        &self,
        task: &T,
        epoch: u64,
        attempt: u32,
        err: &TaskError,
    ) -> RunOutcome {
        error!(task_id = task.id(), task = task.name(), attempts = attempt, error = %err, "task permanently failed");
        self.publish_attempt(task, epoch, attempt, EventKind::TaskExhausted, |ev| {
            ev.with_reason(err.to_string())
        });
        RunOutcome::Exhausted
    }

    fn publish_failed<T: Task + ?Sized>(
        &self,
        task: &T,
        epoch: u64,
        attempt: u32,
        err: &TaskError,
        elapsed: Duration,
    ) {
        self.publish_attempt(task, epoch, attempt, EventKind::TaskFailed, |ev| {
            ev.with_elapsed(elapsed).with_reason(err.to_string())
        });
    }

    /// Publishes an event for one attempt, tagged with its epoch and attempt number.
    fn publish_attempt<T: Task + ?Sized>(
        &self,
        task: &T,
        epoch: u64,
        attempt: u32,
        kind: EventKind,
        build: impl FnOnce(Event) -> Event,
    ) {
        self.publish(task, kind, |ev| build(ev.with_epoch(epoch).with_attempt(attempt)));
    }

    /// Publishes a task event built on top of the task's id and name.
    pub(crate) fn publish<T: Task + ?Sized>(
        &self,
        task: &T,
        kind: EventKind,
        build: impl FnOnce(Event) -> Event,
    ) {
        self.bus
            .publish(build(Event::new(kind).with_task(task.id(), task.name())));
    }

    pub(crate) fn bus(&self) -> &Bus {
        &self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskFactory;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn executor(limit: u32, retry_panics: bool) -> Executor {
        Executor::new(
            WorkerPool::new(2),
            Bus::new(64),
            BackoffPolicy::exponential(Duration::from_millis(1)),
            limit,
            retry_panics,
        )
    }

    fn counting(
        f: &TaskFactory,
        calls: Arc<AtomicU32>,
        fail_first: u32,
    ) -> Arc<dyn Task> {
        f.task("flaky", move |_ctx| {
            let calls = calls.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n <= fail_first {
                    Err(TaskError::fail(format!("boom #{n}")))
                } else {
                    Ok(())
                }
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn stops_after_limit() {
        let exec = executor(3, true);
        let calls = Arc::new(AtomicU32::new(0));
        let task = counting(&TaskFactory::new(), calls.clone(), u32::MAX);

        let out = exec.run(task.as_ref(), &TaskConfig::default(), &Epoch::new(1)).await;
        assert_eq!(out, RunOutcome::Exhausted);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn task_limit_overrides_default() {
        let exec = executor(3, true);
        let calls = Arc::new(AtomicU32::new(0));
        let task = counting(&TaskFactory::new(), calls.clone(), u32::MAX);
        let cfg = TaskConfig::default().with_retry_limit(5);

        exec.run(task.as_ref(), &cfg, &Epoch::new(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_before_limit() {
        let exec = executor(3, true);
        let calls = Arc::new(AtomicU32::new(0));
        let task = counting(&TaskFactory::new(), calls.clone(), 2);

        let out = exec.run(task.as_ref(), &TaskConfig::default(), &Epoch::new(1)).await;
        assert_eq!(out, RunOutcome::Succeeded);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn fatal_errors_are_not_retried() {
        let exec = executor(3, true);
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let task = TaskFactory::new().task("fatal", move |_ctx| {
            c.fetch_add(1, Ordering::SeqCst);
            async { Err(TaskError::fatal("bad input")) }
        });

        let out = exec.run(task.as_ref(), &TaskConfig::default(), &Epoch::new(1)).await;
        assert_eq!(out, RunOutcome::Exhausted);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn panics_follow_the_configured_policy() {
        for (retry_panics, expected_calls) in [(true, 2), (false, 1)] {
            let exec = executor(2, retry_panics);
            let calls = Arc::new(AtomicU32::new(0));
            let c = calls.clone();
            let task = TaskFactory::new().task("panics", move |_ctx| {
                c.fetch_add(1, Ordering::SeqCst);
                async {
                    if true {
                        panic!("broken invariant");
                    }
                    Ok(())
                }
            });

            let out = exec.run(task.as_ref(), &TaskConfig::default(), &Epoch::new(1)).await;
            assert_eq!(out, RunOutcome::Exhausted);
            assert_eq!(calls.load(Ordering::SeqCst), expected_calls);
        }
    }

    #[tokio::test]
    async fn cancelled_epoch_consumes_no_attempt() {
        let exec = executor(3, true);
        let calls = Arc::new(AtomicU32::new(0));
        let task = counting(&TaskFactory::new(), calls.clone(), 0);
        let epoch = Epoch::new(1);
        epoch.token().cancel();

        let out = exec.run(task.as_ref(), &TaskConfig::default(), &epoch).await;
        assert_eq!(out, RunOutcome::Skipped);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancellation_during_backoff_stops_retrying() {
        let exec = Executor::new(
            WorkerPool::new(1),
            Bus::new(16),
            BackoffPolicy::exponential(Duration::from_secs(60)),
            5,
            true,
        );
        let calls = Arc::new(AtomicU32::new(0));
        let task = counting(&TaskFactory::new(), calls.clone(), u32::MAX);
        let epoch = Arc::new(Epoch::new(1));

        let e = epoch.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            e.token().cancel();
        });

        let out = exec.run(task.as_ref(), &TaskConfig::default(), &epoch).await;
        assert_eq!(out, RunOutcome::Skipped);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn every_run_event_carries_the_epoch() {
        let exec = executor(2, true);
        let mut rx = exec.bus().subscribe();
        let calls = Arc::new(AtomicU32::new(0));
        let factory = TaskFactory::new();

        let failing = counting(&factory, calls.clone(), u32::MAX);
        exec.run(failing.as_ref(), &TaskConfig::default(), &Epoch::new(7)).await;

        let stopped = Epoch::new(7);
        stopped.token().cancel();
        let skipped = counting(&factory, calls.clone(), 0);
        exec.run(skipped.as_ref(), &TaskConfig::default(), &stopped).await;

        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            assert_eq!(ev.epoch, Some(7), "{:?} without epoch", ev.kind);
            assert!(ev.attempt.is_some(), "{:?} without attempt", ev.kind);
            kinds.push(ev.kind);
        }
        assert!(kinds.contains(&EventKind::TaskExhausted));
        assert_eq!(kinds.last(), Some(&EventKind::TaskSkipped));
    }
}
