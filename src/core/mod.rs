//! Engine core: batch execution and defaults.
//!
//! This module contains the machinery behind [`BatchTask`](crate::BatchTask). The
//! only public API from this module is [`Config`].
//!
//! Internal modules:
//! - [`runner`]: shared task state, the per-element contract and one continuation's
//!   batch loop for each policy;
//! - [`config`]: builder defaults.

mod config;
mod runner;

pub use config::Config;
pub(crate) use runner::{Callback, Inner};
