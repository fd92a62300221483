//! # Epoch: one generation of the scheduler's cancellation scope.
//!
//! An epoch bundles the cancellation token every scheduled unit listens to and the
//! tracker that counts outstanding work (wait-group semantics). `reset()` retires the
//! current epoch and installs the next one; nothing scheduled in one epoch ever
//! observes another.
//!
//! ```text
//! Epoch { id, token, tracker }
//!   schedule_*  ──► tracker.spawn / tracker.track_future   (count += 1)
//!   finish      ──► count -= 1
//!   retire()    ──► token.cancel() ─► tracker.close() ─► tracker.wait()  (count == 0)
//! ```

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

#[derive(Debug)]
pub(crate) struct Epoch {
    id: u64,
    token: CancellationToken,
    tracker: TaskTracker,
}

impl Epoch {
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            token: CancellationToken::new(),
            tracker: TaskTracker::new(),
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub(crate) fn tracker(&self) -> &TaskTracker {
        &self.tracker
    }

    /// Number of tracked units still running.
    pub(crate) fn outstanding(&self) -> usize {
        self.tracker.len()
    }

    /// Cancels the epoch and waits until every tracked unit has exited.
    ///
    /// Safe to call more than once.
    pub(crate) async fn retire(&self) {
        self.token.cancel();
        self.tracker.close();
        self.tracker.wait().await;
    }
}
