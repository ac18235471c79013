//! # Run one batch of a task.
//!
//! A [`Continuation`] is the deferred job that performs one batch and, if work
//! remains, schedules the next continuation. [`Inner`] is the state they share with
//! the task handle.
//!
//! ## Flow
//! ```text
//! Continuation::run(start):
//!   ├─ canceled?            → publish BatchSkipped, exit
//!   ├─ publish BatchStarted
//!   ├─ dispatch on policy:
//!   │    Atomic       → process(start)
//!   │    Iterations   → process(start..start+amount)
//!   │    Milliseconds → process(start..) while now - t0 < budget
//!   │         └─ any process() == false → task settled, exit
//!   ├─ canceled meanwhile?  → exit
//!   └─ publish BatchYielded, schedule(next)
//!
//! process(i):
//!   ├─ i >= len             → completed, settle Ok, publish TaskCompleted, false
//!   ├─ callback(values[i]) == Stop
//!   │                       → completed, settle Ok, publish TaskStopped, false
//!   └─ otherwise            → true
//! ```
//!
//! ## Rules
//! - The cancellation check happens once per continuation, before any element.
//! - Indices only move forward; the next batch starts at the first unprocessed index.
//! - A continuation dropped without handing off (callback panic, scheduler
//!   discarding the job) settles the task as [`BatchError::Abandoned`], or as
//!   [`BatchError::Canceled`] if the token is already canceled. If the task already
//!   settled this is a no-op.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{
    clock::ClockRef,
    error::BatchError,
    events::{Bus, Event, EventKind},
    policies::BatchPolicy,
    scheduler::SchedulerRef,
    tasks::{Flow, Settle},
};

/// Type-erased processing callback.
pub(crate) type Callback<T> = Box<dyn FnMut(&T) -> Flow + Send + 'static>;

/// State shared by a task handle and its continuations.
pub(crate) struct Inner<T> {
    pub(crate) name: Arc<str>,
    pub(crate) values: Vec<T>,
    pub(crate) policy: BatchPolicy,
    callback: Mutex<Callback<T>>,
    scheduler: SchedulerRef,
    clock: ClockRef,
    token: CancellationToken,
    completed: AtomicBool,
    processed: AtomicUsize,
    settle: Settle,
    bus: Bus,
}

impl<T: Send + Sync + 'static> Inner<T> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: Arc<str>,
        values: Vec<T>,
        callback: Callback<T>,
        policy: BatchPolicy,
        scheduler: SchedulerRef,
        clock: ClockRef,
        settle: Settle,
        bus: Bus,
    ) -> Self {
        Self {
            name,
            values,
            policy,
            callback: Mutex::new(callback),
            scheduler,
            clock,
            token: CancellationToken::new(),
            completed: AtomicBool::new(false),
            processed: AtomicUsize::new(0),
            settle,
            bus,
        }
    }

    /// Queues the first continuation. Never runs the callback.
    pub(crate) fn start(self: &Arc<Self>) {
        self.publish(|| {
            Event::new(EventKind::TaskScheduled)
                .with_task(Arc::clone(&self.name))
                .with_reason(self.policy.to_string())
        });
        self.schedule(0);
    }

    /// Hands a continuation starting at `start` to the scheduler.
    fn schedule(self: &Arc<Self>, start: usize) {
        let continuation = Continuation {
            inner: Arc::clone(self),
            start,
            handed_off: false,
        };
        self.scheduler.defer(Box::new(move || continuation.run()));
    }

    pub(crate) fn is_canceled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub(crate) fn is_completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }

    pub(crate) fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }

    pub(crate) fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Marks the task canceled and tries to settle it as such.
    pub(crate) fn cancel(&self) {
        self.token.cancel();
        if self.settle.settle(Err(BatchError::Canceled)) {
            self.publish(|| {
                Event::new(EventKind::TaskCanceled)
                    .with_task(Arc::clone(&self.name))
                    .with_processed(self.processed())
                    .with_reason(BatchError::Canceled.to_string())
            });
        }
    }

    /// Applies the callback to the element at `index`.
    ///
    /// Returns `false` once the task is done: either the input is exhausted or the
    /// callback asked to stop. In both cases the task is marked completed and settled.
    fn process(&self, index: usize) -> bool {
        let Some(value) = self.values.get(index) else {
            self.complete(EventKind::TaskCompleted, index);
            return false;
        };

        let flow = {
            let mut callback = self.callback.lock().unwrap_or_else(PoisonError::into_inner);
            (callback)(value)
        };
        self.processed.fetch_add(1, Ordering::SeqCst);

        if flow.is_stop() {
            self.complete(EventKind::TaskStopped, index);
            return false;
        }
        true
    }

    fn complete(&self, kind: EventKind, index: usize) {
        self.completed.store(true, Ordering::SeqCst);
        if self.settle.settle(Ok(())) {
            self.publish(|| {
                let ev = Event::new(kind)
                    .with_task(Arc::clone(&self.name))
                    .with_processed(self.processed());
                match kind {
                    EventKind::TaskStopped => ev.with_index(index),
                    _ => ev,
                }
            });
        }
    }

    /// Processes exactly one element. Returns the next start index if work remains.
    fn run_atomic(&self, start: usize) -> Option<usize> {
        self.process(start).then_some(start + 1)
    }

    /// Processes up to `amount` elements. Returns the next start index if work remains.
    fn run_iterations(&self, start: usize, amount: usize) -> Option<usize> {
        for offset in 0..amount {
            if !self.process(start + offset) {
                return None;
            }
        }
        Some(start + amount)
    }

    /// Processes elements while the batch has run for less than `budget`.
    ///
    /// The budget is checked before each element, so the batch may overrun it by
    /// the duration of the last element processed.
    fn run_milliseconds(&self, start: usize, budget: Duration) -> Option<usize> {
        let started = self.clock.now();
        let mut index = start;

        while self.clock.now().saturating_sub(started) < budget {
            if !self.process(index) {
                return None;
            }
            index += 1;
        }
        Some(index)
    }

    /// Builds and publishes an event only when someone is listening.
    #[inline]
    fn publish(&self, event: impl FnOnce() -> Event) {
        if self.bus.has_receivers() {
            self.bus.publish(event());
        }
    }
}

/// One scheduled batch of a task.
struct Continuation<T: Send + Sync + 'static> {
    inner: Arc<Inner<T>>,
    start: usize,
    handed_off: bool,
}

impl<T: Send + Sync + 'static> Continuation<T> {
    fn run(mut self) {
        let inner = Arc::clone(&self.inner);
        let start = self.start;

        if inner.is_canceled() {
            inner.publish(|| {
                Event::new(EventKind::BatchSkipped)
                    .with_task(Arc::clone(&inner.name))
                    .with_index(start)
            });
            return;
        }

        inner.publish(|| {
            Event::new(EventKind::BatchStarted)
                .with_task(Arc::clone(&inner.name))
                .with_index(start)
        });
        let batch_started = inner.clock.now();

        let next = match inner.policy {
            BatchPolicy::Atomic => inner.run_atomic(start),
            BatchPolicy::Iterations { amount } => inner.run_iterations(start, amount),
            BatchPolicy::Milliseconds { budget } => inner.run_milliseconds(start, budget),
        };

        let Some(next) = next else {
            return;
        };
        if inner.is_canceled() {
            return;
        }

        inner.publish(|| {
            Event::new(EventKind::BatchYielded)
                .with_task(Arc::clone(&inner.name))
                .with_index(next)
                .with_processed(inner.processed())
                .with_elapsed(inner.clock.now().saturating_sub(batch_started))
        });
        self.handed_off = true;
        inner.schedule(next);
    }
}

impl<T: Send + Sync + 'static> Drop for Continuation<T> {
    fn drop(&mut self) {
        if !self.handed_off {
            // cancel() flips the token before settling; don't beat it to the slot.
            let err = if self.inner.is_canceled() {
                BatchError::Canceled
            } else {
                BatchError::Abandoned
            };
            self.inner.settle.settle(Err(err));
        }
    }
}
