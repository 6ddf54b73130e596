//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
///
/// The payload type `V` is opaque to the cache; it only needs to be
/// serializable so the entry can round-trip through the disk tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    /// The key this entry is stored under
    pub key: String,
    /// The stored value
    pub value: V,
    /// Absolute expiration time, None = no expiration
    pub expires_at: Option<DateTime<Utc>>,
    /// Last successful read (or creation) time
    pub last_access: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry with optional TTL.
    ///
    /// The entry's `last_access` is stamped with the current time.
    ///
    /// # Arguments
    /// * `key` - The key the entry is stored under
    /// * `value` - The value to store
    /// * `ttl_seconds` - Optional TTL in seconds
    pub fn new(key: impl Into<String>, value: V, ttl_seconds: Option<u64>) -> Self {
        let now = Utc::now();
        let expires_at = ttl_seconds.map(|ttl| now + Duration::seconds(ttl as i64));

        Self {
            key: key.into(),
            value,
            expires_at,
            last_access: now,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at the given instant.
    ///
    /// This is the single expiration predicate for the whole cache: the
    /// lazy-on-read path and the eager sweep both call it, so the two
    /// cannot disagree about what "expired" means.
    ///
    /// Boundary condition: an entry is considered expired when the given
    /// time is greater than or equal to the expiration time. This ensures
    /// that once the TTL duration has fully elapsed, the entry is
    /// immediately expired.
    ///
    /// # Returns
    /// - `true` if the entry has an expiration and `now >= expires_at`
    /// - `false` if the entry has no expiration (never expires) or the TTL
    ///   hasn't elapsed
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    /// Checks if the entry has expired right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    // == Touch ==
    /// Marks the entry as read at the given instant.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_access = now;
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired (TTL elapsed)
    /// - `Some(remaining_ms)` if the entry has TTL and hasn't expired
    /// - `None` if the entry has no TTL (never expires)
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at.map(|expires| {
            let remaining = expires - Utc::now();
            remaining.num_milliseconds().max(0) as u64
        })
    }

    /// Returns remaining TTL in seconds, or None if no expiration is set.
    #[allow(dead_code)]
    pub fn ttl_remaining(&self) -> Option<u64> {
        self.ttl_remaining_ms().map(|ms| ms / 1000)
    }
}
