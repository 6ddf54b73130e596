//! Error types for the cache
//!
//! Provides unified error handling using thiserror.
//!
//! These errors stay internal to the disk tier: the cache is best-effort,
//! so the public `CacheManager` operations log failures and degrade to
//! "absent" (reads) or "memory-only" (writes) instead of propagating them.

use std::path::PathBuf;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache-internal failures.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Payload or entry could not be serialized for the disk tier
    #[error("Serialization failed for key '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Durable record exists but could not be deserialized
    #[error("Corrupt record at {path:?}: {source}")]
    CorruptRecord {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Underlying storage I/O failed
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

// == Result Type Alias ==
/// Convenience Result type for cache-internal operations.
pub type Result<T> = std::result::Result<T, CacheError>;
