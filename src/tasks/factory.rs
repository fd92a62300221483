//! # Task id allocation.
//!
//! [`TaskFactory`] owns a monotonically increasing id counter. Each
//! [`Scheduler`](crate::Scheduler) carries one (see [`Scheduler::tasks`](crate::Scheduler::tasks)),
//! and standalone factories can be created for tests or for tasks built before a
//! scheduler exists. Clones share the same counter.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::task_fn::TaskFn;

/// Allocator of unique task ids and builder of [`TaskFn`] tasks.
#[derive(Clone, Debug, Default)]
pub struct TaskFactory {
    seq: Arc<AtomicU64>,
}

impl TaskFactory {
    /// Creates a factory whose first id is `1`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next id. Ids are never reused by this factory or its clones.
    pub fn next_id(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Builds a closure-backed task with a fresh id.
    pub fn task<F, Fut>(&self, name: impl Into<Cow<'static, str>>, f: F) -> Arc<TaskFn<F>>
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.task_from(name, Some(f))
    }

    /// Builds a closure-backed task from an optional callback.
    ///
    /// With `None` every execution fails with a fatal `"empty callback"` error.
    pub fn task_from<F, Fut>(
        &self,
        name: impl Into<Cow<'static, str>>,
        f: Option<F>,
    ) -> Arc<TaskFn<F>>
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Arc::new(TaskFn::new(self.next_id(), name, f))
    }
}
