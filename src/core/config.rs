//! # Task defaults.
//!
//! Provides [`Config`], the settings a [`BatchTaskBuilder`](crate::BatchTaskBuilder)
//! starts from. Share one `Config` across tasks to keep their batching uniform.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1
//! - zero policy parameters → clamped by [`BatchPolicy::clamped`]

use crate::policies::BatchPolicy;

/// Default settings for batch tasks.
///
/// ## Field semantics
/// - `policy`: Batching policy used unless the builder sets one explicitly
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct Config {
    /// Default batching policy.
    pub policy: BatchPolicy,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `policy = BatchPolicy::default()` (16ms budget)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            policy: BatchPolicy::default(),
            bus_capacity: 1024,
        }
    }
}
