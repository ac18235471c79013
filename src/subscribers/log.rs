//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [scheduled] task="resize" policy=iterations(64)
//! [batch] task="resize" from=0
//! [yield] task="resize" next=64 processed=64 elapsed=812µs
//! [skipped] task="resize" from=128
//! [completed] task="resize" processed=5000
//! [stopped] task="resize" at=17 processed=18
//! [canceled] task="resize" processed=128
//! [subscriber-overflow] subscriber="progress" reason=full
//! [subscriber-panicked] subscriber="progress" info=boom
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
///
/// Enabled via the `logging` feature.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Formats an event as a single log line.
pub(crate) fn format_event(e: &Event) -> String {
    let task = e.task.as_deref().unwrap_or("unknown");
    match e.kind {
        EventKind::TaskScheduled => format!(
            "[scheduled] task={task:?} policy={}",
            e.reason.as_deref().unwrap_or("unknown")
        ),
        EventKind::BatchStarted => format!("[batch] task={task:?} from={}", e.index.unwrap_or(0)),
        EventKind::BatchYielded => format!(
            "[yield] task={task:?} next={} processed={} elapsed={}µs",
            e.index.unwrap_or(0),
            e.processed.unwrap_or(0),
            e.elapsed_us.unwrap_or(0)
        ),
        EventKind::BatchSkipped => {
            format!("[skipped] task={task:?} from={}", e.index.unwrap_or(0))
        }
        EventKind::TaskCompleted => format!(
            "[completed] task={task:?} processed={}",
            e.processed.unwrap_or(0)
        ),
        EventKind::TaskStopped => format!(
            "[stopped] task={task:?} at={} processed={}",
            e.index.unwrap_or(0),
            e.processed.unwrap_or(0)
        ),
        EventKind::TaskCanceled => format!(
            "[canceled] task={task:?} processed={}",
            e.processed.unwrap_or(0)
        ),
        EventKind::SubscriberOverflow => format!(
            "[subscriber-overflow] subscriber={task:?} reason={}",
            e.reason.as_deref().unwrap_or("unknown")
        ),
        EventKind::SubscriberPanicked => format!(
            "[subscriber-panicked] subscriber={task:?} info={}",
            e.reason.as_deref().unwrap_or("unknown")
        ),
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        println!("{}", format_event(e));
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
