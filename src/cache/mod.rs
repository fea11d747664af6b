//! Volatile session storage with per-entry expiry.
//!
//! Expiry is owned by the cache. Lookups never extend a session: a token is
//! valid for exactly the TTL it was stored with.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::CacheError;

pub use memory::InMemorySessionCache;
pub use postgres::PgSessionCache;

/// Writes between opportunistic sweeps of expired entries.
const SWEEP_EVERY_WRITES: u64 = 1024;

/// Counts a write; true on every `SWEEP_EVERY_WRITES`th one.
fn sweep_due(writes: &AtomicU64) -> bool {
    writes.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY_WRITES == SWEEP_EVERY_WRITES - 1
}

/// Session token -> username mapping.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// Store `token` for exactly `ttl` from now, replacing any previous entry.
    async fn put(&self, token: &str, username: &str, ttl: Duration) -> Result<(), CacheError>;

    /// `CacheError::NotFound` for unknown, expired and deleted tokens alike.
    async fn get(&self, token: &str) -> Result<String, CacheError>;

    /// Idempotent.
    async fn delete(&self, token: &str) -> Result<(), CacheError>;
}
