//! # Event subscribers.
//!
//! ```text
//! Executor ── publish(Event) ──► Bus ──► scheduler listener ──► SubscriberSet::emit
//!                                                                 ├──► Metrics
//!                                                                 ├──► Audit
//!                                                                 └──► ...
//! ```
//!
//! Implement [`Subscribe`] and pass instances to
//! [`SchedulerBuilder::with_subscribers`](crate::SchedulerBuilder::with_subscribers).

mod set;
mod subscribe;

pub(crate) use set::panic_message;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
