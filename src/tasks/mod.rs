//! # Batch task handle and construction.
//!
//! This module provides the public task types:
//! - [`BatchTask`] - handle to a running task (cancel, flags, completion future)
//! - [`BatchTaskBuilder`] - chooses policy, scheduler, clock, name and subscribers
//! - [`Flow`] - what a processing callback returns
//! - [`Done`] - future settled once with the task's [`Outcome`]

mod builder;
mod done;
mod flow;
mod task;

pub use builder::BatchTaskBuilder;
pub(crate) use done::Settle;
pub use done::{Done, Outcome};
pub use flow::Flow;
pub use task::BatchTask;
