use std::sync::Arc;
use std::time::Duration;

use ipintel_core::MemoryCacheStore;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Periodically purges expired entries from the in-memory store.
///
/// Expired entries already read as absent; this only bounds memory.
pub fn spawn_sweeper(cache: Arc<MemoryCacheStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = cache.cleanup();
            debug!(removed, remaining = cache.len(), "Cache sweep finished");
        }
    })
}
