//! # Example: progress
//!
//! Two batch tasks share one scheduler while a ticker keeps running on the same thread.
//!
//! Shows how to:
//! - Share a [`TokioScheduler`] between tasks so their batches interleave
//! - Attach the built-in [`LogWriter`] to watch batches and terminal events
//! - Stop a task early from its callback, and cancel another from outside
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► "checksum": milliseconds(2) over 200k numbers   → completes
//!   ├─► "search":   iterations(500), returns false on hit → completes early
//!   ├─► "slow":     atomic, canceled after 50ms          → Err(canceled)
//!   └─► ticker prints every 10ms while all of that runs
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example progress --features logging
//! ```

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;

use batchvisor::{BatchPolicy, BatchTask, LogWriter, Subscribe, TokioScheduler};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    println!("=== progress example ===\n");

    let scheduler = TokioScheduler::new();
    let subs = || -> Vec<Arc<dyn Subscribe>> { vec![Arc::new(LogWriter::new())] };

    let sum = Arc::new(AtomicU64::new(0));
    let acc = Arc::clone(&sum);
    let checksum = BatchTask::builder(0..200_000u64, move |n: &u64| {
        acc.fetch_add(n % 97, Ordering::Relaxed);
    })
    .name("checksum")
    .policy(BatchPolicy::milliseconds(2))
    .scheduler(scheduler.clone())
    .with_subscribers(subs())
    .spawn();

    let search = BatchTask::builder(0..100_000u32, |n: &u32| n.wrapping_mul(2_654_435_761) % 10_007 != 1)
        .name("search")
        .policy(BatchPolicy::iterations(500))
        .scheduler(scheduler.clone())
        .with_subscribers(subs())
        .spawn();

    let slow = BatchTask::builder(0..1_000u32, |_: &u32| std::thread::sleep(Duration::from_millis(5)))
        .name("slow")
        .policy(BatchPolicy::Atomic)
        .scheduler(scheduler.clone())
        .with_subscribers(subs())
        .spawn();

    let ticker = tokio::spawn(async {
        for n in 0..5 {
            println!("[ticker] tick #{n}");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    slow.cancel();

    checksum.done().await?;
    search.done().await?;
    match slow.done().await {
        Ok(()) => println!("slow finished before cancel"),
        Err(e) => println!("slow: {e} after {} elements", slow.processed()),
    }
    ticker.await?;

    println!("\nchecksum = {}", sum.load(Ordering::Relaxed));
    println!("search stopped after {} elements", search.processed());

    // Let the subscriber workers flush their queues.
    tokio::time::sleep(Duration::from_millis(20)).await;
    Ok(())
}
