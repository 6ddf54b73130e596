//! TTL Sweep Task
//!
//! Background task that periodically evicts expired cache entries from both
//! tiers. The sweep is an optimization on top of lazy eviction-on-read: it
//! reclaims memory and disk space for entries nobody asks for again.

use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheManager;

/// Spawns a background task that periodically sweeps expired entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. Each sweep scans the memory tier and the disk tier with
/// the same expiration predicate the read path uses.
///
/// # Arguments
/// * `cache` - Manager handle shared with the rest of the process
/// * `sweep_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_sweep_task<V>(cache: CacheManager<V>, sweep_interval_secs: u64) -> JoinHandle<()>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let interval = Duration::from_secs(sweep_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting TTL sweep task with interval of {} seconds",
            sweep_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.sweep_expired().await;

            if removed > 0 {
                info!("TTL sweep: removed {} expired entries", removed);
            } else {
                debug!("TTL sweep: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use std::time::Duration;
    use tempfile::tempdir;

    fn test_manager(dir: &tempfile::TempDir) -> CacheManager<String> {
        CacheManager::new(&CacheConfig::default().with_cache_dir(dir.path()))
    }

    #[tokio::test]
    async fn test_sweep_task_removes_expired_entries() {
        let dir = tempdir().unwrap();
        let cache = test_manager(&dir);

        let persist = cache
            .store_value_with_ttl("expire_soon", "value".to_string(), Some(1), true)
            .await;
        persist.unwrap().await.unwrap();

        let handle = spawn_sweep_task(cache.clone(), 1);

        // Wait for the entry to expire and a sweep to run
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(cache.memory_len().await, 0);
        assert!(!cache.is_persisted("expire_soon").await);

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_preserves_valid_entries() {
        let dir = tempdir().unwrap();
        let cache = test_manager(&dir);

        cache
            .store_value_with_ttl("long_lived", "value".to_string(), Some(3600), false)
            .await;

        let handle = spawn_sweep_task(cache.clone(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(
            cache.retrieve_value("long_lived").await,
            Some("value".to_string())
        );

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let dir = tempdir().unwrap();
        let cache = test_manager(&dir);

        let handle = spawn_sweep_task(cache, 1);

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
