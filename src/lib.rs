//! # batchvisor
//!
//! **Batchvisor** runs long iterations without blocking the thread they share.
//!
//! A [`BatchTask`] applies a callback to every element of an input, in order, and
//! cuts the work into batches. Each batch runs as a deferred continuation handed to
//! a scheduler; between batches the thread goes back to whatever else is queued
//! (I/O, timers, other tasks). The crate is designed as a building block for
//! cooperative runtimes, UI loops and async services that must stay responsive
//! while chewing through large inputs.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   BatchTask::new(values, callback, policy)
//!        │
//!        ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Inner (shared task state)                                        │
//! │  - values, callback, BatchPolicy                                  │
//! │  - CancellationToken (canceled) / AtomicBool (completed)          │
//! │  - Settle (first-writer-wins slot) ──────────► Done (future)      │
//! │  - Bus (broadcast events)                                         │
//! └──────┬────────────────────────────────────────────────────────────┘
//!        │ defer(continuation @ i)
//!        ▼
//! ┌──────────────────────────┐      ┌──────────────────────────────┐
//! │ Schedule                 │      │ Clock                        │
//! │ - TokioScheduler (worker)│      │ - MonotonicClock             │
//! │ - ManualScheduler (FIFO) │      │ - ManualClock                │
//! └──────┬───────────────────┘      └──────────────┬───────────────┘
//!        │ later: job()                            │ now()
//!        ▼                                         │
//!   Continuation::run ◄────────────────────────────┘
//!     ├─ canceled? exit
//!     ├─ one batch per policy (Atomic / Iterations / Milliseconds)
//!     └─ work left? defer(continuation @ next)
//! ```
//!
//! ### Event flow
//! ```text
//! Continuation ── publish(Event) ──► Bus ──┬──► BatchTask::subscribe() receivers
//!                                          └──► listener ──► SubscriberSet ──► Subscribe::on_event
//! ```
//!
//! ## Features
//! | Area              | Description                                                    | Key types / traits                          |
//! |-------------------|----------------------------------------------------------------|---------------------------------------------|
//! | **Tasks**         | Start, observe, cancel and await batch tasks.                  | [`BatchTask`], [`BatchTaskBuilder`], [`Done`] |
//! | **Policies**      | One element, fixed count or time budget per batch.             | [`BatchPolicy`]                             |
//! | **Callbacks**     | Keep going or stop early from inside the callback.             | [`Flow`]                                    |
//! | **Scheduling**    | Pluggable run-later primitive.                                 | [`Schedule`], [`TokioScheduler`], [`ManualScheduler`] |
//! | **Time**          | Pluggable monotonic clock.                                     | [`Clock`], [`MonotonicClock`], [`ManualClock`] |
//! | **Subscriber API**| Hook into task events (logging, progress, metrics).            | [`Subscribe`], [`SubscriberSet`]            |
//! | **Errors**        | Typed completion errors.                                       | [`BatchError`]                              |
//! | **Configuration** | Shared defaults for builders.                                  | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use batchvisor::{BatchError, BatchPolicy, BatchTask};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), BatchError> {
//!     let found = Arc::new(Mutex::new(None));
//!     let slot = Arc::clone(&found);
//!
//!     // Search a large input in batches of 1000, stopping at the first match.
//!     let task = BatchTask::new(
//!         0..1_000_000u32,
//!         move |n: &u32| {
//!             if n * 7 % 1_000_003 == 42 {
//!                 *slot.lock().unwrap() = Some(*n);
//!                 return false;
//!             }
//!             true
//!         },
//!         BatchPolicy::iterations(1000),
//!     );
//!
//!     task.done().await?;
//!     assert!(task.is_completed());
//!     println!("found: {:?}", found.lock().unwrap());
//!     Ok(())
//! }
//! ```
mod clock;
mod core;
mod error;
mod events;
mod policies;
mod scheduler;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use clock::{Clock, ClockRef, ManualClock, MonotonicClock};
pub use crate::core::Config;
pub use error::BatchError;
pub use events::{Bus, Event, EventKind};
pub use policies::BatchPolicy;
pub use scheduler::{Job, ManualScheduler, Schedule, SchedulerRef, TokioScheduler};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{BatchTask, BatchTaskBuilder, Done, Flow, Outcome};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
