//! # Worker pool: bounded admission for task execution.
//!
//! Only the act of running `execute` is gated; scheduling loops (delays, tickers)
//! are not. Acquiring races the epoch token, and cancellation wins ties so nothing
//! new starts once shutdown has begun.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

#[derive(Clone, Debug)]
pub(crate) struct WorkerPool {
    sem: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    pub(crate) fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            sem: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// Waits for a free slot, or returns `None` if `token` is cancelled first.
    ///
    /// The slot is released when the returned permit is dropped.
    pub(crate) async fn acquire(&self, token: &CancellationToken) -> Option<OwnedSemaphorePermit> {
        let permit = self.sem.clone().acquire_owned();
        tokio::pin!(permit);

        tokio::select! {
            biased;
            _ = token.cancelled() => None,
            res = &mut permit => res.ok(),
        }
    }

    pub(crate) fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn available(&self) -> usize {
        self.sem.available_permits()
    }
}
