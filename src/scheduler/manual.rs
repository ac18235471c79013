//! # Manually stepped scheduler.
//!
//! [`ManualScheduler`] keeps deferred jobs in a FIFO queue until the host drains it.
//! It is the deterministic counterpart of [`TokioScheduler`](crate::TokioScheduler):
//! tests step one "tick" at a time, and hosts with their own main loop can drain it
//! once per frame.
//!
//! ## Draining
//! ```text
//! run_next()          → runs the oldest job, if any
//! run_only_pending()  → runs the jobs queued at call time; jobs they defer wait
//! run_all()           → runs until the queue is empty
//! ```
//!
//! # Example
//! ```
//! use std::sync::{Arc, Mutex};
//! use batchvisor::{BatchPolicy, BatchTask, ManualScheduler};
//!
//! let scheduler = ManualScheduler::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//!
//! let task = BatchTask::builder(vec![1, 2, 3], move |v: &i32| sink.lock().unwrap().push(*v))
//!     .policy(BatchPolicy::iterations(2))
//!     .scheduler(scheduler.clone())
//!     .spawn();
//!
//! assert_eq!(scheduler.run_only_pending(), 1);
//! assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
//!
//! scheduler.run_all();
//! assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
//! assert!(task.is_completed());
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use super::{Job, Schedule};

/// FIFO queue of deferred jobs, drained explicitly.
///
/// Cloning yields a handle to the same queue.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Arc<Mutex<VecDeque<Job>>>,
}

impl ManualScheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued jobs.
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    /// Runs the oldest queued job. Returns `false` if the queue was empty.
    ///
    /// The queue lock is released before the job runs, so the job may defer more work.
    pub fn run_next(&self) -> bool {
        let job = self.lock().pop_front();
        match job {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Runs the jobs queued at the time of the call and returns how many ran.
    ///
    /// Jobs deferred while these run stay queued for the next call.
    pub fn run_only_pending(&self) -> usize {
        let pending = self.pending();
        let mut ran = 0;
        while ran < pending && self.run_next() {
            ran += 1;
        }
        ran
    }

    /// Runs jobs until the queue is empty and returns how many ran.
    ///
    /// Never returns if jobs keep deferring new jobs forever.
    pub fn run_all(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        ran
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Job>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Schedule for ManualScheduler {
    fn defer(&self, job: Job) {
        self.lock().push_back(job);
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) -> Job) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let make = move |n: u32| -> Job {
            let sink = Arc::clone(&sink);
            Box::new(move || sink.lock().unwrap().push(n))
        };
        (log, make)
    }

    #[test]
    fn test_defer_does_not_run_immediately() {
        let (log, job) = recorder();
        let s = ManualScheduler::new();
        s.defer(job(1));
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(s.pending(), 1);
    }

    #[test]
    fn test_jobs_run_fifo() {
        let (log, job) = recorder();
        let s = ManualScheduler::new();
        s.defer(job(1));
        s.defer(job(2));
        s.defer(job(3));
        assert_eq!(s.run_all(), 3);
        assert_eq!(*log.lock().unwrap(), vec![1, 2, 3]);
        assert!(!s.run_next());
    }

    #[test]
    fn test_run_only_pending_leaves_new_jobs_queued() {
        let (log, job) = recorder();
        let s = ManualScheduler::new();
        let inner = s.clone();
        let second = job(2);
        let first = job(1);
        s.defer(Box::new(move || {
            first();
            inner.defer(second);
        }));

        assert_eq!(s.run_only_pending(), 1);
        assert_eq!(*log.lock().unwrap(), vec![1]);
        assert_eq!(s.pending(), 1);

        assert_eq!(s.run_only_pending(), 1);
        assert_eq!(*log.lock().unwrap(), vec![1, 2]);
    }
}
