//! Memory Store Module
//!
//! The fast in-memory tier: a thread-safe mapping from key to cache entry.
//!
//! The store is a plain mapping with no policy of its own; expiration
//! decisions and cross-tier coordination live in the manager. Reads share
//! a readers-writer lock so a read-heavy workload does not serialize.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::cache::CacheEntry;

// == Memory Store ==
/// Thread-safe in-memory tier.
#[derive(Debug, Default)]
pub struct MemoryStore<V> {
    /// Key-value storage
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> MemoryStore<V> {
    // == Constructor ==
    /// Creates a new empty MemoryStore.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    // == Put ==
    /// Stores an entry, replacing any existing mapping for its key.
    pub async fn put(&self, entry: CacheEntry<V>) {
        let mut entries = self.entries.write().await;
        entries.insert(entry.key.clone(), entry);
    }

    // == Get ==
    /// Returns a copy of the entry for `key`, or None if absent.
    ///
    /// The copy is intentional: the tiers never share a mutable entry, so
    /// callers can inspect or promote it without holding the lock.
    pub async fn get(&self, key: &str) -> Option<CacheEntry<V>> {
        let entries = self.entries.read().await;
        entries.get(key).cloned()
    }

    // == Touch ==
    /// Updates the last-access time of an entry, if present.
    pub async fn touch(&self, key: &str, now: DateTime<Utc>) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(key) {
            entry.touch(now);
        }
    }

    // == Remove ==
    /// Removes an entry by key. Removing an absent key is a no-op.
    ///
    /// Returns true if an entry was actually removed.
    pub async fn remove(&self, key: &str) -> bool {
        let mut entries = self.entries.write().await;
        entries.remove(key).is_some()
    }

    // == Clear ==
    /// Removes all entries.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }

    // == Sweep Expired ==
    /// Removes all entries expired as of `now`.
    ///
    /// Returns the number of entries removed.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    // == Length ==
    /// Returns the current number of entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    // == Is Empty ==
    #[allow(dead_code)]
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_put_and_get() {
        let store = MemoryStore::new();

        store
            .put(CacheEntry::new("key1", "value1".to_string(), None))
            .await;

        let entry = store.get("key1").await.unwrap();
        assert_eq!(entry.value, "value1");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let store: MemoryStore<String> = MemoryStore::new();
        assert!(store.get("nonexistent").await.is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemoryStore::new();

        store
            .put(CacheEntry::new("key1", "value1".to_string(), None))
            .await;
        store
            .put(CacheEntry::new("key1", "value2".to_string(), None))
            .await;

        assert_eq!(store.get("key1").await.unwrap().value, "value2");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove() {
        let store = MemoryStore::new();

        store.put(CacheEntry::new("key1", 1u32, None)).await;

        assert!(store.remove("key1").await);
        assert!(store.get("key1").await.is_none());

        // Removing again is a harmless no-op
        assert!(!store.remove("key1").await);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = MemoryStore::new();

        store.put(CacheEntry::new("key1", 1u32, None)).await;
        store.put(CacheEntry::new("key2", 2u32, None)).await;

        store.clear().await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_touch_updates_access_time() {
        let store = MemoryStore::new();
        store.put(CacheEntry::new("key1", 1u32, None)).await;

        let later = Utc::now() + Duration::seconds(30);
        store.touch("key1", later).await;

        assert_eq!(store.get("key1").await.unwrap().last_access, later);
    }

    #[tokio::test]
    async fn test_sweep_expired_removes_only_stale_entries() {
        let store = MemoryStore::new();

        store.put(CacheEntry::new("stale", 1u32, Some(1))).await;
        store.put(CacheEntry::new("fresh", 2u32, Some(3600))).await;
        store.put(CacheEntry::new("eternal", 3u32, None)).await;

        let removed = store.sweep_expired(Utc::now() + Duration::seconds(2)).await;

        assert_eq!(removed, 1);
        assert!(store.get("stale").await.is_none());
        assert!(store.get("fresh").await.is_some());
        assert!(store.get("eternal").await.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_access() {
        use std::sync::Arc;

        let store = Arc::new(MemoryStore::new());
        let mut handles = vec![];

        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let key = format!("key{}", i);
                store
                    .put(CacheEntry::new(key.clone(), format!("value{}", i), None))
                    .await;
                store.get(&key).await
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap().is_some());
        }
        assert_eq!(store.len().await, 16);
    }
}
