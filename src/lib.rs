//! # tasktide
//!
//! **tasktide** is an in-process task scheduling engine for tokio applications.
//!
//! It runs units of work immediately, after a delay, or periodically, under a bounded
//! concurrency budget, with exponential-backoff retries, per-attempt timeouts, panic
//! containment and a blocking, reusable reset for graceful shutdown.
//!
//! ## Architecture
//! ```text
//!   schedule_now   schedule_async   schedule_after   schedule_periodic
//!        │               │                │                 │
//!        ▼               ▼                ▼                 ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ Scheduler                                                           │
//! │  - Epoch { CancellationToken, TaskTracker }   (rotated by reset())  │
//! │  - spawns delay waits / ticker & sequential loops (not pool-bound)  │
//! └───────────────────────────────┬─────────────────────────────────────┘
//!                                 ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ Executor (per run)                                                  │
//! │  for attempt in 1..=limit:                                          │
//! │    ├─► acquire WorkerPool slot   (races epoch cancellation)         │
//! │    ├─► run_once: child token + timeout + catch_unwind               │
//! │    ├─► Ok → done │ Canceled → done │ Timeout → done                 │
//! │    └─► Fail/panic → backoff.delay_after(attempt) → sleep → retry    │
//! └───────────────────────────────┬─────────────────────────────────────┘
//!                                 ▼
//!                 tracing logs  +  Bus ──► SubscriberSet ──► Subscribe impls
//! ```
//!
//! ## Features
//! | Area              | Description                                             | Key types                                 |
//! |-------------------|---------------------------------------------------------|-------------------------------------------|
//! | **Tasks**         | Cancelable async work with a unique id and a name       | [`Task`], [`TaskFn`], [`TaskFactory`]     |
//! | **Per-task policy** | Retry limit, timeout, periodic mode                   | [`TaskConfig`]                            |
//! | **Scheduling**    | Now, async, delayed, periodic (ticker or sequential)    | [`Scheduler`]                             |
//! | **Policies**      | Exponential backoff with optional jitter                | [`BackoffPolicy`], [`JitterPolicy`]       |
//! | **Events**        | Observable outcomes for metrics, audit, tests           | [`Event`], [`EventKind`], [`Subscribe`]   |
//! | **Errors**        | Failure taxonomy driving retry classification           | [`TaskError`]                             |
//! | **Configuration** | Engine-wide settings                                    | [`SchedulerConfig`]                       |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use tasktide::{Scheduler, TaskConfig, TaskError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let scheduler = Scheduler::new(2, 3);
//!
//!     let hello = scheduler.tasks().task("hello", |ctx: CancellationToken| async move {
//!         if ctx.is_cancelled() {
//!             return Err(TaskError::Canceled);
//!         }
//!         println!("Hello from task!");
//!         Ok(())
//!     });
//!
//!     let cfg = TaskConfig::default().with_timeout(Duration::from_secs(5));
//!     scheduler.schedule_now(hello, Some(cfg)).await;
//!
//!     // Stop everything and re-arm for reuse.
//!     scheduler.reset().await;
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod policies;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use config::{DEFAULT_RETRY_LIMIT, SchedulerConfig};
pub use core::{Scheduler, SchedulerBuilder};
pub use error::TaskError;
pub use events::{Bus, Event, EventKind};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{
    BoxTaskFuture, EmptyFn, Task, TaskConfig, TaskFactory, TaskFn, TaskRef, UNNAMED_TASK,
};
