//! Error types produced by scheduled tasks.
//!
//! [`TaskError`] is what a [`Task`](crate::Task) returns from `execute`, and what the
//! executor classifies to decide between success, cancellation, timeout, retry and
//! permanent failure.
//!
//! | Variant     | Retried | Logged at |
//! |-------------|---------|-----------|
//! | `Fail`      | yes     | warn (per attempt), error once exhausted |
//! | `Fatal`     | no      | error     |
//! | `Timeout`   | no      | error     |
//! | `Canceled`  | no      | info      |

use std::fmt::Display;
use std::time::Duration;

use thiserror::Error;

/// # Errors produced by task execution.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Attempt exceeded its configured timeout.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The per-attempt timeout that elapsed.
        timeout: Duration,
    },

    /// Non-recoverable error; the executor never retries it.
    #[error("fatal error (no retry): {reason}")]
    Fatal {
        /// The underlying error message.
        reason: String,
    },

    /// Transient failure; retried up to the effective retry limit.
    #[error("execution failed: {reason}")]
    Fail {
        /// The underlying error message.
        reason: String,
    },

    /// The task observed cancellation of its context and stopped.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    pub fn fail(reason: impl Display) -> Self {
        TaskError::Fail {
            reason: reason.to_string(),
        }
    }

    /// Shorthand for [`TaskError::Fatal`].
    pub fn fatal(reason: impl Display) -> Self {
        TaskError::Fatal {
            reason: reason.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use tasktide::TaskError;
    ///
    /// let err = TaskError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "task_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Fatal { .. } => "task_fatal",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Whether another attempt may be made after this error.
    ///
    /// Only [`TaskError::Fail`] is retryable. Timeouts are not retried within the same
    /// scheduling call; periodic jobs get a fresh attempt on their next cycle instead.
    ///
    /// ```
    /// use tasktide::TaskError;
    ///
    /// assert!(TaskError::fail("boom").is_retryable());
    /// assert!(!TaskError::fatal("nope").is_retryable());
    /// assert!(!TaskError::Canceled.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, TaskError::Fail { .. })
    }
}
