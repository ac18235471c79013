//! Deferred execution.
//!
//! A batch task never runs its continuations itself: it hands each one to a
//! [`Schedule`] implementation, which runs it **later**, after the caller's current
//! synchronous work, in FIFO order relative to other deferred jobs.
//!
//! ## Contents
//! - [`Schedule`] the deferral primitive
//! - [`TokioScheduler`] a worker task on the Tokio runtime, yielding between jobs
//! - [`ManualScheduler`] an explicit queue stepped by the host (tests, custom loops)
//!
//! ## Contract
//! ```text
//! defer(job)  ─► queue ─► (later) job()
//!   - never runs `job` before `defer` returns
//!   - jobs run one at a time, in the order they were deferred
//! ```

mod manual;
mod worker;

use std::sync::Arc;

pub use manual::ManualScheduler;
pub use worker::TokioScheduler;

/// A deferred unit of work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Shared handle to a scheduler.
pub type SchedulerRef = Arc<dyn Schedule>;

/// Run-later primitive.
pub trait Schedule: Send + Sync + 'static {
    /// Queues `job` to run after the current synchronous execution.
    ///
    /// Implementations must not run `job` before returning and must run jobs in
    /// the order they were deferred.
    fn defer(&self, job: Job);
}
