//! Batching policies.
//!
//! This module groups the knob that controls **how much** work a task performs
//! before it yields back to the scheduler.
//!
//! ## Contents
//! - [`BatchPolicy`] one element / fixed count / time budget per continuation
//!
//! ## Quick wiring
//! ```text
//! BatchTaskBuilder { policy: BatchPolicy, .. }
//!      └─► task::Inner::run_batch dispatches on the policy:
//!           - Atomic       → process one index
//!           - Iterations   → process `amount` indices
//!           - Milliseconds → process while clock.now() - start < budget
//! ```
//!
//! ## Defaults
//! - `BatchPolicy::default()` → `Milliseconds { budget: 16ms }`.

mod batch;

pub use batch::BatchPolicy;
