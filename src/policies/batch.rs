//! # Batching policies.
//!
//! [`BatchPolicy`] decides how much work one continuation performs before the task
//! yields back to the scheduler.
//!
//! - [`BatchPolicy::Atomic`] one element per continuation.
//! - [`BatchPolicy::Iterations`] a fixed number of elements per continuation.
//! - [`BatchPolicy::Milliseconds`] elements are processed until the continuation has
//!   been running for `budget`, then the task yields.
//!
//! ## Choosing the right policy
//! ```text
//! Expensive, uneven elements        → Atomic
//! Cheap, uniform elements           → Iterations { amount }
//! Latency target (e.g. frame time)  → Milliseconds { budget }
//! ```
//!
//! ## Milliseconds overshoot
//! The budget is checked **before** each element, never during one. A batch can
//! therefore run past `budget` by the duration of its last element.
//!
//! ## Sentinel values
//! - `amount = 0` → treated as 1
//! - `budget = 0s` → treated as 1µs (positive budgets, sub-millisecond included, are kept)
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use batchvisor::BatchPolicy;
//!
//! let policy = BatchPolicy::Iterations { amount: 0 }.clamped();
//! assert_eq!(policy, BatchPolicy::Iterations { amount: 1 });
//!
//! let policy = BatchPolicy::milliseconds(16);
//! assert_eq!(policy, BatchPolicy::Milliseconds { budget: Duration::from_millis(16) });
//! ```

use std::fmt;
use std::time::Duration;

/// Budget a zero milliseconds policy runs with.
const MIN_BUDGET: Duration = Duration::from_micros(1);

/// Strategy dividing a task into batches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchPolicy {
    /// Process exactly one element per continuation.
    Atomic,
    /// Process up to `amount` elements per continuation.
    Iterations {
        /// Elements per batch (`> 0`).
        amount: usize,
    },
    /// Process elements while the continuation has been running for less than `budget`.
    Milliseconds {
        /// Time budget per batch (`> 0`).
        budget: Duration,
    },
}

impl BatchPolicy {
    /// Shorthand for [`BatchPolicy::Iterations`].
    #[inline]
    pub fn iterations(amount: usize) -> Self {
        BatchPolicy::Iterations { amount }
    }

    /// Shorthand for [`BatchPolicy::Milliseconds`] with a whole-millisecond budget.
    #[inline]
    pub fn milliseconds(ms: u64) -> Self {
        BatchPolicy::Milliseconds {
            budget: Duration::from_millis(ms),
        }
    }

    /// Returns the policy with sentinel parameters replaced by their minimums.
    ///
    /// A zero amount or budget would make no progress per continuation; the task
    /// would reschedule itself forever.
    #[must_use]
    pub fn clamped(self) -> Self {
        match self {
            BatchPolicy::Atomic => BatchPolicy::Atomic,
            BatchPolicy::Iterations { amount } => BatchPolicy::Iterations {
                amount: amount.max(1),
            },
            BatchPolicy::Milliseconds { budget } if budget.is_zero() => {
                BatchPolicy::Milliseconds { budget: MIN_BUDGET }
            }
            BatchPolicy::Milliseconds { budget } => BatchPolicy::Milliseconds { budget },
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            BatchPolicy::Atomic => "atomic",
            BatchPolicy::Iterations { .. } => "iterations",
            BatchPolicy::Milliseconds { .. } => "milliseconds",
        }
    }
}

impl Default for BatchPolicy {
    /// Returns a 16ms budget, one frame at 60Hz.
    fn default() -> Self {
        BatchPolicy::milliseconds(16)
    }
}

impl fmt::Display for BatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchPolicy::Atomic => f.write_str("atomic"),
            BatchPolicy::Iterations { amount } => write!(f, "iterations({amount})"),
            BatchPolicy::Milliseconds { budget } => write!(f, "milliseconds({budget:?})"),
        }
    }
}
