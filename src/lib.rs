//! Tiered Cache - A lightweight two-tier cache for serializable values
//!
//! Keeps a fast in-memory tier in front of a durable on-disk tier, with
//! TTL expiration applied lazily on every read and eagerly by an optional
//! background sweep. A global clear publishes an invalidation event so
//! other parts of the process can react.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{
    CacheEntry, CacheManager, CacheStats, CacheStatsSnapshot, DiskStore, InvalidationBroadcaster,
    InvalidationEvent, MemoryStore,
};
pub use config::CacheConfig;
pub use tasks::spawn_sweep_task;
