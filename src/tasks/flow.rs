//! # Callback return contract.
//!
//! A processing callback tells the task whether to keep going by returning anything
//! convertible into [`Flow`]:
//!
//! | Callback returns        | Meaning          |
//! |-------------------------|------------------|
//! | `()`                    | continue         |
//! | `true` / `false`        | continue / stop  |
//! | `ControlFlow::Continue` | continue         |
//! | `ControlFlow::Break`    | stop             |
//! | `Flow`                  | as given         |
//!
//! Stopping is **not** an error: the task completes successfully right after the
//! element that asked to stop, like a `break` in a regular loop.

use std::ops::ControlFlow;

/// Whether the task should process the next element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Flow {
    /// Keep processing.
    #[default]
    Continue,
    /// Stop after this element and complete the task.
    Stop,
}

impl Flow {
    /// Returns `true` for [`Flow::Stop`].
    #[inline]
    pub fn is_stop(self) -> bool {
        matches!(self, Flow::Stop)
    }
}

impl From<()> for Flow {
    #[inline]
    fn from(_: ()) -> Self {
        Flow::Continue
    }
}

impl From<bool> for Flow {
    #[inline]
    fn from(keep_going: bool) -> Self {
        if keep_going {
            Flow::Continue
        } else {
            Flow::Stop
        }
    }
}

impl<B> From<ControlFlow<B>> for Flow {
    #[inline]
    fn from(cf: ControlFlow<B>) -> Self {
        match cf {
            ControlFlow::Continue(()) => Flow::Continue,
            ControlFlow::Break(_) => Flow::Stop,
        }
    }
}
