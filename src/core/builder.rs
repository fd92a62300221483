use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::config::SchedulerConfig;
use crate::core::executor::Executor;
use crate::core::pool::WorkerPool;
use crate::core::scheduler::Scheduler;
use crate::events::Bus;
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::tasks::TaskFactory;

/// Builder for a [`Scheduler`] with subscribers or a shared task id space.
pub struct SchedulerBuilder {
    cfg: SchedulerConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    tasks: Option<TaskFactory>,
}

impl SchedulerBuilder {
    pub fn new(cfg: SchedulerConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            tasks: None,
        }
    }

    /// Sets event subscribers.
    ///
    /// With at least one subscriber, [`build`](Self::build) spawns a listener task and
    /// must be called inside a tokio runtime.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Shares an existing id space instead of starting a new one.
    pub fn with_task_factory(mut self, tasks: TaskFactory) -> Self {
        self.tasks = Some(tasks);
        self
    }

    pub fn build(self) -> Scheduler {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let executor = Executor::new(
            WorkerPool::new(self.cfg.worker_limit()),
            bus.clone(),
            self.cfg.backoff,
            self.cfg.retry_limit(),
            self.cfg.retry_panics,
        );
        let listener = spawn_listener(&bus, self.subscribers);

        Scheduler::from_parts(
            self.cfg,
            executor,
            self.tasks.unwrap_or_default(),
            listener,
        )
    }
}

/// Forwards bus events to the subscriber set until the scheduler is dropped.
fn spawn_listener(bus: &Bus, subscribers: Vec<Arc<dyn Subscribe>>) -> Option<JoinHandle<()>> {
    if subscribers.is_empty() {
        return None;
    }
    let set = SubscriberSet::new(subscribers, bus.clone());
    let mut rx = bus.subscribe();

    Some(tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => set.emit(ev),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber listener lagged behind the event bus");
                }
                Err(RecvError::Closed) => break,
            }
        }
        set.shutdown().await;
    }))
}
