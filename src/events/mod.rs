//! Batch task events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** every
//! [`BatchTask`](crate::BatchTask) publishes to while it runs.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: the task's continuations and [`BatchTask::cancel`](crate::BatchTask::cancel).
//! - **Consumers**: [`BatchTask::subscribe`](crate::BatchTask::subscribe) receivers and the
//!   listener that feeds a [`SubscriberSet`](crate::SubscriberSet).

mod bus;
mod event;

pub use bus::Bus;
pub(crate) use bus::WeakBus;
pub use event::{Event, EventKind};
