//! # Events emitted by batch tasks.
//!
//! The [`EventKind`] enum classifies event types across two categories:
//! - **Batch events**: one continuation's work (started, yielded, skipped)
//! - **Terminal events**: how the task settled (completed, stopped early, canceled)
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task name,
//! the index a batch started from, and how many elements were processed.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use batchvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::BatchYielded)
//!     .with_task("thumbnails")
//!     .with_index(128)
//!     .with_processed(64)
//!     .with_elapsed(Duration::from_millis(16));
//!
//! assert_eq!(ev.kind, EventKind::BatchYielded);
//! assert_eq!(ev.task.as_deref(), Some("thumbnails"));
//! assert_eq!(ev.index, Some(128));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of batch task events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Batch events ===
    /// The first continuation was handed to the scheduler.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: policy description
    TaskScheduled,

    /// A continuation is about to process a batch.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `index`: first index of the batch
    BatchStarted,

    /// A batch finished with work remaining; the next continuation is queued.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `index`: first index of the next batch
    /// - `processed`: total callback invocations so far
    /// - `elapsed_us`: time spent in this batch (µs)
    BatchYielded,

    /// A queued continuation found the task canceled and did nothing.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `index`: index the batch would have started from
    BatchSkipped,

    // === Terminal events ===
    /// The input was exhausted.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `processed`: total callback invocations
    TaskCompleted,

    /// The callback asked to stop; the task completed early.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `index`: index of the element that stopped the task
    /// - `processed`: total callback invocations
    TaskStopped,

    /// The task was canceled before it completed.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `processed`: callback invocations before cancellation
    /// - `reason`: `"canceled"`
    TaskCanceled,

    // === Subscriber events ===
    /// A subscriber panicked while handling an event.
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: panic message
    SubscriberPanicked,

    /// A subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: `"full"` or `"closed"`
    SubscriberOverflow,
}

impl EventKind {
    /// Returns `true` for events that mark the end of a task.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EventKind::TaskCompleted | EventKind::TaskStopped | EventKind::TaskCanceled
        )
    }
}

/// Batch task event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,

    /// Event classification.
    pub kind: EventKind,
    /// Name of the task, if applicable.
    pub task: Option<Arc<str>>,
    /// Element index the event refers to.
    pub index: Option<usize>,
    /// Callback invocations performed by the task so far.
    pub processed: Option<usize>,
    /// Time spent inside one batch in microseconds (compact).
    pub elapsed_us: Option<u64>,
    /// Human-readable reason or detail.
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            index: None,
            processed: None,
            elapsed_us: None,
            reason: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches an element index.
    #[inline]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Attaches the number of processed elements.
    #[inline]
    pub fn with_processed(mut self, processed: usize) -> Self {
        self.processed = Some(processed);
        self
    }

    /// Attaches a batch duration (stored as microseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        let us = d.as_micros().min(u128::from(u64::MAX)) as u64;
        self.elapsed_us = Some(us);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    /// Batch duration, if recorded.
    #[inline]
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed_us.map(Duration::from_micros)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::BatchStarted);
        let b = Event::new(EventKind::BatchStarted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_elapsed_roundtrips_at_microsecond_precision() {
        let ev = Event::new(EventKind::BatchYielded).with_elapsed(Duration::from_micros(1500));
        assert_eq!(ev.elapsed_us, Some(1500));
        assert_eq!(ev.elapsed(), Some(Duration::from_micros(1500)));
    }

    #[test]
    fn test_terminal_kinds() {
        assert!(EventKind::TaskCompleted.is_terminal());
        assert!(EventKind::TaskStopped.is_terminal());
        assert!(EventKind::TaskCanceled.is_terminal());
        assert!(!EventKind::BatchYielded.is_terminal());
        assert!(!EventKind::BatchSkipped.is_terminal());
        assert!(!EventKind::SubscriberPanicked.is_terminal());
    }

    #[test]
    fn test_subscriber_event_constructors() {
        let ev = Event::subscriber_overflow("recorder", "full");
        assert_eq!(ev.kind, EventKind::SubscriberOverflow);
        assert_eq!(ev.task.as_deref(), Some("recorder"));
        assert_eq!(ev.reason.as_deref(), Some("full"));

        let ev = Event::subscriber_panicked("recorder", "boom".to_string());
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.reason.as_deref(), Some("boom"));
    }
}
