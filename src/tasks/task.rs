//! # Task capability.
//!
//! A [`Task`] has a process-unique [`id`](Task::id), a display [`name`](Task::name) and an
//! async [`execute`](Task::execute) method that receives a [`CancellationToken`].
//! The common handle type is [`TaskRef`], an `Arc<dyn Task>` shared with the scheduler.
//!
//! Domain-specific tasks implement the trait directly and take their id from a
//! [`TaskFactory`](crate::TaskFactory).

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Placeholder used when a task is created with an empty name.
pub const UNNAMED_TASK: &str = "unnamed-task";

/// Shared handle to a task.
pub type TaskRef = Arc<dyn Task>;

/// # Asynchronous, cancelable unit of work.
///
/// # Contract
/// - `execute` may be called with a token that is already cancelled.
/// - Once cancellation is observed, `execute` must return promptly
///   (conventionally with [`TaskError::Canceled`]).
/// - The scheduler imposes no locking on whatever the task closes over.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use tasktide::{Task, TaskError, TaskFactory};
///
/// struct Report { id: u64 }
///
/// #[async_trait]
/// impl Task for Report {
///     fn id(&self) -> u64 { self.id }
///     fn name(&self) -> &str { "daily-report" }
///
///     async fn execute(&self, ctx: CancellationToken) -> Result<(), TaskError> {
///         if ctx.is_cancelled() {
///             return Err(TaskError::Canceled);
///         }
///         Ok(())
///     }
/// }
///
/// let factory = TaskFactory::new();
/// let report = Report { id: factory.next_id() };
/// assert_eq!(report.id(), 1);
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Unique, never reused identifier.
    fn id(&self) -> u64;

    /// Human-readable label used in logs and events.
    fn name(&self) -> &str;

    /// Runs one attempt of the task.
    async fn execute(&self, ctx: CancellationToken) -> Result<(), TaskError>;
}
