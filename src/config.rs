//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Root directory for the durable tier; wholly owned by the cache
    pub cache_dir: PathBuf,
    /// Default TTL in seconds for stored values; None = entries never expire
    pub default_ttl: Option<u64>,
    /// Background sweep task interval in seconds
    pub sweep_interval: u64,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DIR` - Durable tier root directory (default: `<tmp>/tiered_cache`)
    /// - `DEFAULT_TTL` - Default TTL in seconds, 0 disables expiration (default: 300)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        let default_ttl = env::var("DEFAULT_TTL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);

        Self {
            cache_dir: env::var("CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_cache_dir()),
            // 0 means "no default expiration"
            default_ttl: (default_ttl > 0).then_some(default_ttl),
            sweep_interval: env::var("SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }

    /// Replaces the durable tier root directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Replaces the default TTL (None = never expire).
    pub fn with_default_ttl(mut self, ttl_seconds: Option<u64>) -> Self {
        self.default_ttl = ttl_seconds;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            default_ttl: Some(300),
            sweep_interval: 60,
        }
    }
}

fn default_cache_dir() -> PathBuf {
    env::temp_dir().join("tiered_cache")
}
