use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use super::{sweep_due, SessionCache};
use crate::error::CacheError;

#[derive(Debug)]
struct CacheEntry {
    username: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Process-local session cache. Expired entries are evicted lazily on lookup
/// and in periodic sweeps piggybacked on writes.
#[derive(Debug, Default)]
pub struct InMemorySessionCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    writes: AtomicU64,
}

impl InMemorySessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Entries currently held, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl SessionCache for InMemorySessionCache {
    async fn put(&self, token: &str, username: &str, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| CacheError::Unavailable(format!("ttl {:?} out of range", ttl)))?;
        let entry = CacheEntry {
            username: username.to_string(),
            expires_at,
        };
        self.entries.write().await.insert(token.to_string(), entry);

        if sweep_due(&self.writes) {
            let purged = self.purge_expired().await;
            debug!(purged, "Swept expired sessions");
        }
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<String, CacheError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(token) {
                None => return Err(CacheError::NotFound),
                Some(entry) if !entry.is_expired(now) => return Ok(entry.username.clone()),
                Some(_) => {}
            }
        }

        // Expired: evict, unless it was replaced in the meantime.
        let mut entries = self.entries.write().await;
        match entries.get(token) {
            Some(entry) if !entry.is_expired(now) => Ok(entry.username.clone()),
            Some(_) => {
                entries.remove(token);
                Err(CacheError::NotFound)
            }
            None => Err(CacheError::NotFound),
        }
    }

    async fn delete(&self, token: &str) -> Result<(), CacheError> {
        self.entries.write().await.remove(token);
        Ok(())
    }
}
