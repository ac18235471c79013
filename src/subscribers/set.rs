//! # SubscriberSet: non-blocking fan-out over multiple subscribers
//!
//! [`SubscriberSet`] distributes each [`Event`] to multiple subscribers
//! **without awaiting** their processing.
//!
//! ## What it guarantees
//! - `emit(&Event)` returns immediately.
//! - Per-subscriber FIFO (queue order).
//! - Panics inside subscribers are caught and published as
//!   [`EventKind::SubscriberPanicked`].
//! - Per-subscriber queue overflow is published as [`EventKind::SubscriberOverflow`].
//!
//! ## What it does **not** guarantee
//! - No global ordering across different subscribers.
//! - No retries on per-subscriber queue overflow (events are dropped for that
//!   subscriber).
//! - Reports are lost once the task's bus has closed.
//!
//! ## Diagram
//! ```text
//!    emit(&Event)
//!        │                        (Arc-clone per subscriber)
//!        ├────────────────► [queue S1] ─► worker S1 ─► on_event()
//!        ├────────────────► [queue S2] ─► worker S2 ─► on_event()
//!        │       (full) ──► SubscriberOverflow                └─ panic → SubscriberPanicked
//!        └────────────────► [queue SN] ─► worker SN ─► on_event()
//! ```
//!
//! Reports go back to the bus through a weak handle, so a set never keeps the bus
//! of a finished task open.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};

use crate::events::{Bus, Event, EventKind, WeakBus};

use super::Subscribe;

/// Per-subscriber channel with metadata
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Composite fan-out with per-subscriber bounded queues and worker tasks.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    reports: WeakBus,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker per subscriber.
    ///
    /// Subscriber panics and overflows are published to `bus` while it is open.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime (workers are spawned with `tokio::spawn`).
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: &Bus) -> Self {
        let reports = bus.downgrade();
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);
            let s = Arc::clone(&sub);
            let reports_for_worker = reports.clone();

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = s.on_event(ev.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        // A subscriber that panics on panic reports would feed itself forever.
                        if ev.kind != EventKind::SubscriberPanicked {
                            reports_for_worker
                                .publish(Event::subscriber_panicked(s.name(), panic_message(&*panic_err)));
                        }
                    }
                }
            });

            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }

        Self {
            channels,
            workers,
            reports,
        }
    }

    /// Fan-out one event to all subscribers (non-blocking).
    ///
    /// If a subscriber's queue is **full** or **closed**, the event is dropped for it
    /// and a `SubscriberOverflow` event is published. Overflow events that overflow
    /// themselves are not reported again.
    pub fn emit(&self, event: &Event) {
        let is_overflow_evt = event.kind == EventKind::SubscriberOverflow;
        let ev = Arc::new(event.clone());

        for channel in &self.channels {
            let reason = match channel.sender.try_send(Arc::clone(&ev)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if !is_overflow_evt {
                self.reports
                    .publish(Event::subscriber_overflow(channel.name, reason));
            }
        }
    }

    /// Spawns a listener that forwards every event from `rx` to this set.
    ///
    /// The listener skips over lagged events and shuts the set down once the
    /// bus closes, i.e. once the task that owns it is dropped.
    pub fn forward(self, mut rx: broadcast::Receiver<Event>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => self.emit(&ev),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            self.shutdown().await;
        })
    }

    /// Graceful shutdown: close all queues and await worker completion.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

/// Extracts a printable message from a panic payload.
pub(crate) fn panic_message(any: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
