//! # Event bus for broadcasting batch task events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from inside continuations.
//!
//! ## Architecture
//! ```text
//! Publisher (one per task):          Receivers (many):
//!                                  ┌──► BatchTask::subscribe()
//!   continuation ───► Bus ─────────┤
//!                (broadcast chan)  └──► listener ────► SubscriberSet
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks and needs no runtime.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active receivers at send time.
//! - **Closing**: receivers observe `RecvError::Closed` once the task state is dropped.
//!   A [`WeakBus`] can publish but does not keep the channel open.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for batch task events.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately (send clones internally).
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity.
    ///
    /// The minimum capacity is 1 (clamped).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Returns `true` if at least one receiver is attached.
    ///
    /// Lets publishers skip building events nobody will read.
    #[inline]
    pub fn has_receivers(&self) -> bool {
        self.tx.receiver_count() > 0
    }

    /// Returns a handle that publishes here without keeping the bus open.
    pub(crate) fn downgrade(&self) -> WeakBus {
        WeakBus {
            tx: self.tx.downgrade(),
        }
    }
}

/// Non-owning publisher for a [`Bus`].
#[derive(Clone, Debug)]
pub(crate) struct WeakBus {
    tx: broadcast::WeakSender<Event>,
}

impl WeakBus {
    /// Publishes if the bus is still open. Returns `false` once it closed.
    pub(crate) fn publish(&self, ev: Event) -> bool {
        match self.tx.upgrade() {
            Some(tx) => {
                let _ = tx.send(ev);
                true
            }
            None => false,
        }
    }
}
