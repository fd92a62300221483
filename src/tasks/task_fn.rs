//! # Closure-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`, producing a fresh
//! future per attempt. No state is carried between attempts; shared state belongs in an
//! explicit `Arc<...>` captured by the closure.
//!
//! A `TaskFn` built without a callback still schedules normally, but every attempt fails
//! with a fatal `"empty callback"` error.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use tasktide::{TaskError, TaskFactory, TaskRef};
//!
//! let factory = TaskFactory::new();
//! let t: TaskRef = factory.task("worker", |ctx: CancellationToken| async move {
//!     if ctx.is_cancelled() {
//!         return Err(TaskError::Canceled);
//!     }
//!     Ok(())
//! });
//!
//! assert_eq!(t.name(), "worker");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::task::{Task, UNNAMED_TASK};

/// Boxed future returned by [`EmptyFn`].
pub type BoxTaskFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send + 'static>>;

/// Callback type to name when building a [`TaskFn`] with no callback at all.
///
/// ```
/// use tasktide::{EmptyFn, TaskFactory};
///
/// let factory = TaskFactory::new();
/// let t = factory.task_from::<EmptyFn, _>("placeholder", None);
/// assert!(!t.has_callback());
/// ```
pub type EmptyFn = fn(CancellationToken) -> BoxTaskFuture;

/// Function-backed task implementation.
pub struct TaskFn<F> {
    id: u64,
    name: Cow<'static, str>,
    f: Option<F>,
}

impl<F> TaskFn<F> {
    /// Creates a task with an explicit id.
    ///
    /// Prefer [`TaskFactory::task`](crate::TaskFactory::task), which allocates the id.
    /// An empty `name` is replaced by a placeholder.
    pub fn new(id: u64, name: impl Into<Cow<'static, str>>, f: Option<F>) -> Self {
        let name = name.into();
        let name = if name.is_empty() {
            Cow::Borrowed(UNNAMED_TASK)
        } else {
            name
        };
        Self { id, name, f }
    }

    /// Whether a callback was supplied.
    pub fn has_callback(&self) -> bool {
        self.f.is_some()
    }
}

impl<F> fmt::Debug for TaskFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskFn")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("has_callback", &self.f.is_some())
            .finish()
    }
}

#[async_trait]
impl<F, Fut> Task for TaskFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        match &self.f {
            Some(f) => f(ctx).await,
            None => Err(TaskError::fatal("empty callback")),
        }
    }
}
