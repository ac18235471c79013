//! # Tokio-backed scheduler.
//!
//! [`TokioScheduler`] owns a single worker task that drains an unbounded FIFO queue.
//! After every job the worker calls [`tokio::task::yield_now`], handing the thread
//! back to the runtime so other tasks, timers and I/O get their turn before the next
//! batch.
//!
//! ## Architecture
//! ```text
//! defer(job) ──► [unbounded queue] ──► worker ──► job()
//!                                         │
//!                                         ├─ panic → caught, reported, worker continues
//!                                         └─ yield_now() before the next job
//! ```
//!
//! ## Rules
//! - **FIFO**: jobs run in the order they were deferred, one at a time.
//! - **Never inline**: `defer` only enqueues; the job runs on the worker.
//! - **Panic isolation**: a panicking job does not take the worker down, so other
//!   tasks sharing the scheduler keep running.
//! - **Lifetime**: the worker exits once every handle is dropped and the queue is empty.

use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinHandle};

use super::{Job, Schedule};
use crate::subscribers::panic_message;

/// Deferred execution on the Tokio runtime.
///
/// Cloning yields a handle to the same worker; tasks sharing a scheduler interleave
/// their batches in FIFO order.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<Job>,
    worker: Arc<JoinHandle<()>>,
}

impl TokioScheduler {
    /// Spawns the worker on the current runtime.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    #[must_use]
    pub fn new() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

        let worker = tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                if let Err(panic_err) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(job))
                {
                    eprintln!(
                        "[batchvisor] continuation panicked: {}",
                        panic_message(&*panic_err)
                    );
                }
                tokio::task::yield_now().await;
            }
        });

        Self {
            tx,
            worker: Arc::new(worker),
        }
    }

    /// Returns `true` once the worker has exited.
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Schedule for TokioScheduler {
    fn defer(&self, job: Job) {
        if self.tx.send(job).is_err() {
            eprintln!("[batchvisor] scheduler worker is gone; continuation dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_jobs_run_in_order_after_defer_returns() {
        let scheduler = TokioScheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for n in 0..5 {
            let sink = Arc::clone(&log);
            scheduler.defer(Box::new(move || sink.lock().unwrap().push(n)));
        }
        assert!(log.lock().unwrap().is_empty());

        let (done_tx, done_rx) = tokio::sync::oneshot::channel();
        scheduler.defer(Box::new(move || {
            let _ = done_tx.send(());
        }));
        done_rx.await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_panicking_job_does_not_stop_worker() {
        let scheduler = TokioScheduler::new();
        scheduler.defer(Box::new(|| panic!("boom")));

        let (done_tx, done_rx) = tokio::sync::oneshot::channel();
        scheduler.defer(Box::new(move || {
            let _ = done_tx.send(());
        }));
        done_rx.await.unwrap();
        assert!(!scheduler.is_finished());
    }
}
