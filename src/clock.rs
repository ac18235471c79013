//! # Monotonic time sources.
//!
//! The milliseconds policy measures how long the current batch has been running.
//! It reads time through the [`Clock`] trait so hosts and tests can supply their own
//! source:
//!
//! - [`MonotonicClock`] real time via [`tokio::time::Instant`] (honours paused time
//!   under `tokio::time::pause`).
//! - [`ManualClock`] time that only moves when told to.
//!
//! Readings are only ever compared with each other, never with calendar time.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;

use tokio::time::Instant;

/// Shared handle to a clock.
pub type ClockRef = Arc<dyn Clock>;

/// Source of monotonic time.
pub trait Clock: Send + Sync + 'static {
    /// Time elapsed since an arbitrary, fixed origin.
    fn now(&self) -> Duration;
}

/// Real monotonic clock.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Creates a clock whose origin is the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Creates the clock and returns it as a shared handle.
    pub fn arc() -> ClockRef {
        Arc::new(Self::new())
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock advanced by hand.
///
/// Cloning yields a handle to the same time, so a test can keep one copy and give
/// another to a task.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use batchvisor::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// clock.advance(Duration::from_millis(10));
/// clock.advance(Duration::from_millis(5));
/// assert_eq!(clock.now(), Duration::from_millis(15));
///
/// clock.set(Duration::from_millis(3));
/// assert_eq!(clock.now(), Duration::from_millis(3));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock reading zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the current reading.
    pub fn set(&self, now: Duration) {
        self.nanos.store(to_nanos(now), Ordering::SeqCst);
    }

    /// Moves the reading forward by `by`.
    pub fn advance(&self, by: Duration) {
        let by = to_nanos(by);
        let _ = self
            .nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(n.saturating_add(by))
            });
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

#[inline]
fn to_nanos(d: Duration) -> u64 {
    d.as_nanos().min(u128::from(u64::MAX)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.set(Duration::from_millis(30));
        assert_eq!(other.now(), Duration::from_millis(30));
    }

    #[test]
    fn test_manual_clock_saturates() {
        let clock = ManualClock::new();
        clock.set(Duration::from_nanos(u64::MAX));
        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.now(), Duration::from_nanos(u64::MAX));
    }

    #[tokio::test(start_paused = true)]
    async fn test_monotonic_clock_follows_tokio_time() {
        let clock = MonotonicClock::new();
        assert_eq!(clock.now(), Duration::ZERO);
        tokio::time::advance(Duration::from_millis(25)).await;
        assert_eq!(clock.now(), Duration::from_millis(25));
    }
}
