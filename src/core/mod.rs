//! Runtime core: admission, execution and scheduling.
//!
//! The only public API from this module is [`Scheduler`] and its builder.
//!
//! Internal modules:
//! - [`epoch`]: cancellation scope + outstanding-work tracker, rotated by `reset()`;
//! - [`pool`]: bounded admission gate racing epoch cancellation;
//! - [`runner`]: executes one attempt with timeout and panic containment;
//! - [`executor`]: retry/backoff loop around `runner`, logging and event publishing;
//! - [`scheduler`]: the four scheduling strategies and `reset()`;
//! - [`builder`]: wiring of config, bus, pool and subscribers.

mod builder;
mod epoch;
mod executor;
mod pool;
mod runner;
mod scheduler;

pub use builder::SchedulerBuilder;
pub use scheduler::Scheduler;
