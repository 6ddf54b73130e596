//! Disk Store Module
//!
//! The durable tier: one serialized record per key under a root directory
//! wholly owned by the cache.
//!
//! Record names are derived from the key by SHA-256, so any string key maps
//! to a stable, collision-resistant filename. Writes go to a temporary file
//! first and are renamed into place, so a concurrent read never observes a
//! half-written record. Corrupt or unreadable records are treated as absent
//! and deleted best-effort so they do not fail repeatedly.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, warn};

use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};

/// File extension of durable records.
const RECORD_EXT: &str = "json";

// == Disk Store ==
/// Thread-safe persistence layer for cache entries.
#[derive(Debug)]
pub struct DiskStore<V> {
    /// Root directory holding every durable record
    root: PathBuf,
    _marker: PhantomData<fn() -> V>,
}

impl<V> DiskStore<V> {
    // == Constructor ==
    /// Creates a DiskStore rooted at `root`.
    ///
    /// The directory is created lazily on the first write, so constructing
    /// a store for a read-only path only fails once a persist is attempted.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            _marker: PhantomData,
        }
    }

    /// Returns the root directory of the durable tier.
    #[allow(dead_code)]
    pub fn root(&self) -> &Path {
        &self.root
    }

    // == Record Path ==
    /// Returns the durable location for `key`.
    ///
    /// The name is hex(SHA-256(key)), a stable and collision-resistant
    /// transform that sidesteps filesystem-hostile characters in keys.
    pub fn record_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.root.join(format!("{}.{}", hex::encode(digest), RECORD_EXT))
    }

    /// Checks whether a durable record exists for `key`.
    ///
    /// Only checks presence; the record may still be expired or corrupt.
    pub async fn contains(&self, key: &str) -> bool {
        fs::metadata(self.record_path(key)).await.is_ok()
    }
}

impl<V: Serialize + DeserializeOwned> DiskStore<V> {
    // == Put ==
    /// Serializes `entry` and writes it to the location derived from its key.
    ///
    /// The write is atomic from a reader's point of view: the record is
    /// written to a temporary file in the same directory and renamed over
    /// any previous record.
    pub async fn put(&self, entry: &CacheEntry<V>) -> Result<()> {
        let bytes = serde_json::to_vec(entry).map_err(|source| CacheError::Serialization {
            key: entry.key.clone(),
            source,
        })?;

        fs::create_dir_all(&self.root).await?;

        let path = self.record_path(&entry.key);
        let tmp_path = path.with_extension("tmp");

        fs::write(&tmp_path, &bytes).await?;
        if let Err(e) = fs::rename(&tmp_path, &path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        debug!(key = %entry.key, path = %path.display(), "persisted record");
        Ok(())
    }

    // == Get ==
    /// Reads and deserializes the record for `key`.
    ///
    /// Returns None if no record exists, if reading fails, or if the record
    /// is corrupt. Corrupt records are deleted best-effort. Expiration is
    /// not checked here; that decision belongs to the caller.
    pub async fn get(&self, key: &str) -> Option<CacheEntry<V>> {
        let path = self.record_path(key);

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(key, error = %e, "disk read failed, treating as absent");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(entry) => Some(entry),
            Err(source) => {
                let err = CacheError::CorruptRecord {
                    path: path.clone(),
                    source,
                };
                warn!(key, error = %err, "evicting corrupt record");
                let _ = fs::remove_file(&path).await;
                None
            }
        }
    }

    // == Remove ==
    /// Deletes the durable record for `key`. Absent records are a no-op.
    ///
    /// Returns true if a record was actually removed.
    pub async fn remove(&self, key: &str) -> Result<bool> {
        match fs::remove_file(self.record_path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    // == Clear ==
    /// Removes all durable records.
    ///
    /// Only regular record files (and leftover temporaries) inside the root
    /// are deleted; the directory itself and anything foreign to the cache
    /// are left alone.
    ///
    /// Returns the number of records removed.
    pub async fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        let mut dir = match fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        while let Some(dirent) = dir.next_entry().await? {
            let path = dirent.path();
            let ext = path.extension().and_then(|e| e.to_str());
            if matches!(ext, Some(RECORD_EXT) | Some("tmp")) {
                match fs::remove_file(&path).await {
                    Ok(()) => removed += 1,
                    Err(e) => warn!(path = %path.display(), error = %e, "failed to remove record"),
                }
            }
        }

        Ok(removed)
    }

    // == Sweep Expired ==
    /// Removes all records expired as of `now`.
    ///
    /// Corrupt records encountered during the scan are removed as well.
    /// Returns the number of records removed.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut removed = 0;
        let mut dir = match fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        while let Some(dirent) = dir.next_entry().await? {
            let path = dirent.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXT) {
                continue;
            }

            let stale = match fs::read(&path).await {
                Ok(bytes) => match serde_json::from_slice::<CacheEntry<V>>(&bytes) {
                    Ok(entry) => entry.is_expired_at(now),
                    // Corrupt record, sweep it too
                    Err(_) => true,
                },
                Err(_) => false,
            };

            if stale {
                match fs::remove_file(&path).await {
                    Ok(()) => removed += 1,
                    Err(e) => warn!(path = %path.display(), error = %e, "failed to remove record"),
                }
            }
        }

        Ok(removed)
    }
}
