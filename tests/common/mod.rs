#![allow(dead_code)]

use std::time::Duration;

use tasktide::{BackoffPolicy, Event, EventKind, Scheduler, SchedulerConfig};
use tokio::sync::broadcast;

/// Scheduler whose backoff unit is one millisecond instead of one second.
pub fn fast_scheduler(max_workers: usize, retry_limit: u32) -> Scheduler {
    let mut cfg = SchedulerConfig::new(max_workers, retry_limit);
    cfg.backoff = BackoffPolicy::exponential(Duration::from_millis(1));
    Scheduler::builder(cfg).build()
}

/// Collects every event already sitting in the receiver.
pub fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev);
    }
    out
}

pub fn count(events: &[Event], kind: EventKind) -> usize {
    events.iter().filter(|e| e.kind == kind).count()
}

/// Polls `cond` every few milliseconds until it holds or `limit` elapses.
pub async fn wait_until(limit: Duration, cond: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    cond()
}
