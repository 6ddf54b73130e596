//! Cache Manager Module
//!
//! The façade coordinating the memory and disk tiers.
//!
//! All mutation goes through the manager's public operations so the two
//! tiers never interleave mid-update: reads check memory first and fall
//! back to disk with promotion on hit, expired entries are evicted from
//! both tiers the moment a read finds them, and a global clear empties
//! both tiers before publishing the invalidation event.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{
    CacheEntry, CacheStats, CacheStatsSnapshot, DiskStore, InvalidationBroadcaster,
    InvalidationEvent, MemoryStore,
};
use crate::config::CacheConfig;

// == Cache Manager ==
/// Coordinates the in-memory and on-disk tiers behind one interface.
///
/// The manager is a cheap handle over shared state: clone it freely and
/// hand clones to every call site. The process wiring decides how many
/// managers exist; typically one long-lived instance is created at startup
/// and injected into consumers.
#[derive(Debug)]
pub struct CacheManager<V> {
    /// Fast tier, source of truth for anything not yet flushed
    memory: Arc<MemoryStore<V>>,
    /// Durable tier, holds only explicitly persisted entries
    disk: Arc<DiskStore<V>>,
    /// Fan-out for the "cache cleared" event
    broadcaster: InvalidationBroadcaster,
    /// Hit/miss/eviction counters
    stats: Arc<CacheStats>,
    /// Bumped on every clear; lets racing writes detect that a clear won
    generation: Arc<AtomicU64>,
    /// TTL applied by `store_value`; None = entries never expire
    default_ttl: Option<u64>,
}

impl<V> Clone for CacheManager<V> {
    fn clone(&self) -> Self {
        Self {
            memory: Arc::clone(&self.memory),
            disk: Arc::clone(&self.disk),
            broadcaster: self.broadcaster.clone(),
            stats: Arc::clone(&self.stats),
            generation: Arc::clone(&self.generation),
            default_ttl: self.default_ttl,
        }
    }
}

impl<V> CacheManager<V>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a new CacheManager from configuration.
    ///
    /// The disk tier lives under `config.cache_dir`, which the cache treats
    /// as wholly its own; nothing else should read or write into it.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            memory: Arc::new(MemoryStore::new()),
            disk: Arc::new(DiskStore::new(&config.cache_dir)),
            broadcaster: InvalidationBroadcaster::new(),
            stats: Arc::new(CacheStats::new()),
            generation: Arc::new(AtomicU64::new(0)),
            default_ttl: config.default_ttl,
        }
    }

    // == Store ==
    /// Stores a value under `key` with the configured default TTL.
    ///
    /// The memory write completes before this returns, so a retrieval for
    /// the same key immediately afterwards observes the value (unless a
    /// concurrent remove or clear won the race, which it is allowed to do).
    ///
    /// When `to_disk` is true the entry is additionally persisted, off this
    /// call's execution path: the returned `JoinHandle` belongs to the
    /// spawned disk write. Dropping the handle keeps fire-and-forget
    /// semantics; awaiting it gives callers a flush signal. Persistence
    /// failures are logged and leave the entry memory-only.
    pub async fn store_value(
        &self,
        key: impl Into<String>,
        value: V,
        to_disk: bool,
    ) -> Option<JoinHandle<()>> {
        self.store_value_with_ttl(key, value, self.default_ttl, to_disk)
            .await
    }

    /// Stores a value with an explicit TTL instead of the configured default.
    ///
    /// `ttl_seconds = None` stores an entry that never expires.
    pub async fn store_value_with_ttl(
        &self,
        key: impl Into<String>,
        value: V,
        ttl_seconds: Option<u64>,
        to_disk: bool,
    ) -> Option<JoinHandle<()>> {
        let entry = CacheEntry::new(key, value, ttl_seconds);
        let generation = self.generation.load(Ordering::Acquire);

        self.memory.put(entry.clone()).await;

        // A clear that raced this store must win: if one happened while the
        // entry was going in, take it back out and skip the disk write.
        if self.generation.load(Ordering::Acquire) != generation {
            self.memory.remove(&entry.key).await;
            return None;
        }

        if !to_disk {
            return None;
        }

        let disk = Arc::clone(&self.disk);
        let gen_counter = Arc::clone(&self.generation);
        Some(tokio::spawn(async move {
            let key = entry.key.clone();
            if let Err(e) = disk.put(&entry).await {
                warn!(key = %key, error = %e, "disk persist failed, entry stays memory-only");
                return;
            }
            // A clear completed while the write was in flight; the record
            // must not outlive it.
            if gen_counter.load(Ordering::Acquire) != generation {
                debug!(key = %key, "discarding record persisted across a clear");
                let _ = disk.remove(&key).await;
            }
        }))
    }

    // == Retrieve ==
    /// Retrieves the value stored under `key`, or None if absent.
    ///
    /// Memory is consulted first. On a miss the disk tier is read and a
    /// fresh hit is promoted (copied) into memory. An expired entry found
    /// on either tier is evicted from both and reported as a plain miss;
    /// expiration is never surfaced as an error.
    pub async fn retrieve_value(&self, key: &str) -> Option<V> {
        let now = Utc::now();

        // Fast path: memory tier
        if let Some(entry) = self.memory.get(key).await {
            if entry.is_expired_at(now) {
                self.evict(key).await;
                self.stats.record_miss();
                return None;
            }
            self.memory.touch(key, now).await;
            self.stats.record_hit();
            return Some(entry.value);
        }

        // Slow path: disk tier
        let generation = self.generation.load(Ordering::Acquire);
        match self.disk.get(key).await {
            Some(entry) if entry.is_expired_at(now) => {
                self.evict(key).await;
                self.stats.record_miss();
                None
            }
            Some(mut entry) => {
                entry.touch(now);
                let value = entry.value.clone();

                // Promote into memory unless a clear raced the disk read;
                // the caller still gets the value it legitimately read.
                if self.generation.load(Ordering::Acquire) == generation {
                    self.memory.put(entry).await;
                    if self.generation.load(Ordering::Acquire) != generation {
                        self.memory.remove(key).await;
                    } else {
                        self.stats.record_promotion();
                        debug!(key, "promoted disk record into memory");
                    }
                }

                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Remove ==
    /// Removes `key` from both tiers. Removing an absent key is a no-op.
    pub async fn remove_value(&self, key: &str) {
        self.memory.remove(key).await;
        if let Err(e) = self.disk.remove(key).await {
            warn!(key, error = %e, "failed to remove record from disk");
        }
    }

    // == Clear All ==
    /// Evicts every entry from both tiers, then publishes the invalidation
    /// event exactly once.
    ///
    /// Once this returns, every retrieval returns absent until a new store
    /// happens: the generation bump makes racing stores and in-flight
    /// persists discard their own work, and subscribers observing the event
    /// can assume the cache is already empty.
    pub async fn clear_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);

        self.memory.clear().await;
        match self.disk.clear().await {
            Ok(removed) => debug!(removed, "disk tier cleared"),
            Err(e) => warn!(error = %e, "failed to clear disk tier"),
        }

        let notified = self.broadcaster.publish_cleared();
        info!(notified, "cache cleared");
    }

    // == Clear Memory ==
    /// Drops every in-memory entry, keeping disk records intact.
    ///
    /// This is the memory-pressure relief valve: persisted entries fault
    /// back in from disk on their next read.
    pub async fn clear_memory(&self) {
        self.memory.clear().await;
        debug!("memory tier cleared");
    }

    // == Sweep Expired ==
    /// Eagerly evicts every expired entry from both tiers.
    ///
    /// Purely an optimization; lazy eviction on read already prevents stale
    /// values from being returned. Returns the number of entries removed.
    pub async fn sweep_expired(&self) -> usize {
        let now = Utc::now();

        let from_memory = self.memory.sweep_expired(now).await;
        let from_disk = match self.disk.sweep_expired(now).await {
            Ok(removed) => removed,
            Err(e) => {
                warn!(error = %e, "disk sweep failed");
                0
            }
        };

        let removed = from_memory + from_disk;
        self.stats.record_evictions(removed as u64);
        removed
    }

    // == Subscribe ==
    /// Registers a subscriber for the "cache cleared" event.
    ///
    /// Only clears that complete after this call are observed.
    pub fn subscribe(&self) -> broadcast::Receiver<InvalidationEvent> {
        self.broadcaster.subscribe()
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    // == Inspection ==
    /// Returns the number of entries currently in the memory tier.
    pub async fn memory_len(&self) -> usize {
        self.memory.len().await
    }

    /// Checks whether a durable record exists for `key`.
    pub async fn is_persisted(&self, key: &str) -> bool {
        self.disk.contains(key).await
    }

    /// Evicts `key` from both tiers and counts the eviction.
    async fn evict(&self, key: &str) {
        self.memory.remove(key).await;
        if let Err(e) = self.disk.remove(key).await {
            warn!(key, error = %e, "failed to evict record from disk");
        }
        self.stats.record_eviction();
    }
}
