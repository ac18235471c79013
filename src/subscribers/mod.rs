//! # Event subscribers for batch tasks.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and,
//! behind the `logging` feature, the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! continuation ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit(&Event)
//!                                                              │
//!                                                    ┌─────────┼─────────┐
//!                                                    ▼         ▼         ▼
//!                                                LogWriter  Progress  Custom
//! ```
//!
//! Subscribers are attached with
//! [`BatchTaskBuilder::with_subscribers`](crate::BatchTaskBuilder::with_subscribers).

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub(crate) use set::panic_message;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
