//! Retry timing policies.
//!
//! ## Contents
//! - [`BackoffPolicy`] how long to wait after a failed attempt (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization strategy to avoid synchronized retries
//!
//! ## Quick wiring
//! ```text
//! SchedulerConfig { backoff: BackoffPolicy, .. }
//!      └─► core::executor::Executor uses backoff.delay_after(attempt)
//!          between attempts of a failing task
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → first=2s, factor=2.0, max=Duration::MAX, jitter=None.
//! - `JitterPolicy::None`.

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
