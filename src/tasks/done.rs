//! # Completion signal.
//!
//! [`Done`] is the future a [`BatchTask`](crate::BatchTask) settles exactly once.
//! It is backed by a `oneshot` channel whose sender lives in a first-writer-wins
//! slot: completion, early stop and cancellation race for it, and whichever takes
//! the sender decides the outcome. Later attempts find the slot empty and do
//! nothing.
//!
//! ```text
//! complete()/stop() ──┐
//!                     ├──► slot.take() ──► Some(tx) → tx.send(outcome)   (first wins)
//! cancel()         ───┘                    None     → no-op
//!
//! sender dropped without sending → Err(BatchError::Abandoned)
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};
use std::task::{Context, Poll};

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::oneshot;

use crate::error::BatchError;

/// Outcome of a batch task.
pub type Outcome = Result<(), BatchError>;

/// Single-settlement slot holding the sender half of the completion signal.
pub(crate) struct Settle {
    tx: Mutex<Option<oneshot::Sender<Outcome>>>,
}

impl Settle {
    /// Creates the slot and the matching [`Done`] future.
    pub(crate) fn new() -> (Self, Done) {
        let (tx, rx) = oneshot::channel::<Outcome>();
        let fut = rx
            .map(|res| res.unwrap_or(Err(BatchError::Abandoned)))
            .boxed()
            .shared();
        (
            Self {
                tx: Mutex::new(Some(tx)),
            },
            Done(fut),
        )
    }

    /// Settles with `outcome` unless already settled. Returns `true` if this call won.
    pub(crate) fn settle(&self, outcome: Outcome) -> bool {
        let tx = self
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match tx {
            Some(tx) => {
                let _ = tx.send(outcome);
                true
            }
            None => false,
        }
    }

    /// Returns `true` once any outcome has been recorded.
    pub(crate) fn is_settled(&self) -> bool {
        self.tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

/// Future resolving when the task settles.
///
/// - `Ok(())` when the input is exhausted or the callback stops the task;
/// - `Err(BatchError::Canceled)` when [`cancel`](crate::BatchTask::cancel) came first;
/// - `Err(BatchError::Abandoned)` when the task was dropped before settling.
///
/// Cheap to clone; every clone resolves to the same outcome.
#[derive(Clone)]
#[must_use = "futures do nothing unless awaited"]
pub struct Done(Shared<BoxFuture<'static, Outcome>>);

impl Future for Done {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}

impl std::fmt::Debug for Done {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Done").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_settlement_wins() {
        let (slot, done) = Settle::new();
        assert!(!slot.is_settled());
        assert!(slot.settle(Ok(())));
        assert!(!slot.settle(Err(BatchError::Canceled)));
        assert!(slot.is_settled());
        assert_eq!(done.now_or_never(), Some(Ok(())));
    }

    #[test]
    fn test_clones_share_outcome() {
        let (slot, done) = Settle::new();
        let other = done.clone();
        slot.settle(Err(BatchError::Canceled));
        assert_eq!(done.now_or_never(), Some(Err(BatchError::Canceled)));
        assert_eq!(other.now_or_never(), Some(Err(BatchError::Canceled)));
    }

    #[test]
    fn test_dropped_slot_abandons() {
        let (slot, done) = Settle::new();
        let pending = done.clone();
        assert_eq!(pending.now_or_never(), None);
        drop(slot);
        assert_eq!(done.now_or_never(), Some(Err(BatchError::Abandoned)));
    }
}
