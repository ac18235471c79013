//! Error types surfaced by batch tasks.
//!
//! [`BatchError`] is the only error a [`BatchTask`](crate::BatchTask) reports, and it is
//! reported exclusively through [`BatchTask::done`](crate::BatchTask::done).
//! Panics raised by the processing callback are not wrapped: they propagate out of
//! the continuation that invoked the callback.

use thiserror::Error;

/// # Errors produced by a batch task.
///
/// A task that runs to the end of its input, or whose callback asks to stop,
/// completes successfully. Only the following outcomes are failures.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// The task was canceled before it completed.
    #[error("canceled")]
    Canceled,

    /// The task state was dropped before the task settled.
    ///
    /// Happens when the callback panics mid-batch, or when the scheduler is dropped
    /// while a continuation is still queued.
    #[error("abandoned before completion")]
    Abandoned,
}

impl BatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use batchvisor::BatchError;
    ///
    /// assert_eq!(BatchError::Canceled.as_label(), "batch_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BatchError::Canceled => "batch_canceled",
            BatchError::Abandoned => "batch_abandoned",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BatchError::Canceled => "task canceled before completion".to_string(),
            BatchError::Abandoned => "task dropped before it could settle".to_string(),
        }
    }
}
