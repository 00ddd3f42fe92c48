//! Fallback Sweep Task
//!
//! Background task that periodically removes expired entries from the
//! process-local fallback store.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically sweeps expired fallback entries.
///
/// Entries in the fallback are otherwise only dropped when read, so abandoned
/// rate windows and cached pages would pile up between restarts.
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
pub fn spawn_cleanup_task(cache: Arc<CacheStore>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            interval_secs = cleanup_interval_secs,
            "Starting fallback cleanup task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup_expired().await;
            if removed > 0 {
                info!(removed, "Fallback cleanup removed expired entries");
            } else {
                debug!("Fallback cleanup: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let cache = Arc::new(CacheStore::new(CacheConfig::disabled()));
        cache.set("expire_soon", b"value".to_vec(), 1).await;

        let handle = spawn_cleanup_task(cache.clone(), 1);

        // Expiry is strictly after the TTL, so give it two sweeps
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(cache.stats().await.fallback_entries, 0);
        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let cache = Arc::new(CacheStore::new(CacheConfig::disabled()));
        cache.set("long_lived", b"value".to_vec(), 3600).await;

        let handle = spawn_cleanup_task(cache.clone(), 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(cache.get("long_lived").await, Some(b"value".to_vec()));
        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let cache = Arc::new(CacheStore::new(CacheConfig::disabled()));

        let handle = spawn_cleanup_task(cache, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
