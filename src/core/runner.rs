//! # Run a single attempt of a task.
//!
//! - Derives a **child token** of the epoch token for the attempt
//! - Applies the per-attempt timeout (`tokio::time::timeout`)
//! - Contains panics (`catch_unwind`) so a failing task never takes down the engine
//! - Classifies the result into an [`AttemptOutcome`]
//!
//! ## Classification
//! ```text
//! Ok(())                                  → Succeeded
//! Err(_) while epoch cancelled            → Canceled
//! Err(Canceled)                           → Canceled
//! timeout elapsed / Err(Timeout)          → TimedOut
//! panic                                   → Panicked(payload)
//! Err(Fail | Fatal)                       → Failed(err)
//! ```
//!
//! On timeout the child token is cancelled and the attempt's future is dropped; the
//! child never outlives the attempt and cancelling it never affects the epoch.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::subscribers::panic_message;
use crate::tasks::Task;

/// Result of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AttemptOutcome {
    Succeeded,
    Canceled,
    TimedOut(Duration),
    Panicked(String),
    Failed(TaskError),
}

/// Executes one attempt of `task` under `parent`.
pub(crate) async fn run_once<T: Task + ?Sized>(
    task: &T,
    parent: &CancellationToken,
    timeout: Option<Duration>,
) -> AttemptOutcome {
    let child = parent.child_token();
    let attempt = AssertUnwindSafe(task.execute(child.clone())).catch_unwind();

    let res = match timeout.filter(|d| !d.is_zero()) {
        Some(dur) => match time::timeout(dur, attempt).await {
            Ok(r) => r,
            Err(_elapsed) => {
                child.cancel();
                return AttemptOutcome::TimedOut(dur);
            }
        },
        None => attempt.await,
    };

    match res {
        Err(payload) => AttemptOutcome::Panicked(panic_message(&*payload)),
        Ok(Ok(())) => AttemptOutcome::Succeeded,
        Ok(Err(_)) if parent.is_cancelled() => AttemptOutcome::Canceled,
        Ok(Err(TaskError::Canceled)) => AttemptOutcome::Canceled,
        Ok(Err(TaskError::Timeout { timeout })) => AttemptOutcome::TimedOut(timeout),
        Ok(Err(e)) => AttemptOutcome::Failed(e),
    }
}
