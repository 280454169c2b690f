//! Stats Reporter Task
//!
//! Background task that periodically logs aggregated cache statistics.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use crate::cache::KvStore;

/// Spawns a background task that logs store statistics every
/// `interval_secs` seconds.
///
/// Reading stats takes each shard lock briefly and changes no counters.
///
/// # Arguments
/// * `store` - Shared store to report on
/// * `interval_secs` - Interval in seconds between log lines
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let store: Arc<dyn KvStore> = Arc::new(ShardedStore::new(4, 1 << 20));
/// let reporter = spawn_stats_reporter(store.clone(), 60);
/// // Later, during shutdown:
/// reporter.abort();
/// ```
pub fn spawn_stats_reporter(store: Arc<dyn KvStore>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting stats reporter with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let stats = store.stats();
            info!(
                "Cache stats: sets={} gets={} hit_rate={:.2} evictions={} entries={} memory_used={}/{} bytes",
                stats.sets,
                stats.gets,
                stats.hit_rate(),
                stats.evictions,
                stats.entries,
                stats.memory_used,
                stats.capacity
            );
        }
    })
}
