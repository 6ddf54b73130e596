//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the life of the cache.
//!
//! # Tasks
//! - TTL Sweep: eagerly evicts expired entries from both tiers at configured
//!   intervals

mod sweep;

pub use sweep::spawn_sweep_task;
