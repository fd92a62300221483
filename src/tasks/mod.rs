//! # Task abstractions and per-task configuration.
//!
//! - [`Task`] - trait for async cancelable work with an id and a name
//! - [`TaskFn`] - closure-backed implementation
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task>`)
//! - [`TaskConfig`] - retry limit, timeout and periodic-mode flags
//! - [`TaskFactory`] - id allocator and `TaskFn` builder

mod config;
mod factory;
mod task;
mod task_fn;

pub use config::TaskConfig;
pub use factory::TaskFactory;
pub use task::{Task, TaskRef, UNNAMED_TASK};
pub use task_fn::{BoxTaskFuture, EmptyFn, TaskFn};
