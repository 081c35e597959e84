//! In-process cache backend built on Moka.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::sync::Cache as MokaCache;

use super::{Cache, CacheError, Clock, SystemClock};

/// A stored value together with its own expiry.
#[derive(Clone)]
struct Entry {
    bytes: Arc<[u8]>,
    ttl: Duration,
    expires_at: Instant,
}

/// Lets Moka evict each entry after its own TTL rather than a cache-wide one.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Bounded in-process cache with per-key TTL.
///
/// This cache is:
/// - Thread-safe (Moka handles its own locking)
/// - Capacity-bounded, evicting by TinyLFU when full
/// - Clone-friendly (cloning shares the same underlying cache)
///
/// Expiry is checked against the injected `Clock` on every read, so an
/// entry is never returned past its TTL even before Moka gets around to
/// evicting it.
#[derive(Clone)]
pub struct MemoryCache {
    inner: MokaCache<String, Entry>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    /// Create a cache holding at most `max_capacity` entries.
    pub fn new(max_capacity: u64) -> Self {
        Self::with_clock(max_capacity, Arc::new(SystemClock))
    }

    /// Create a cache that reads time from `clock`.
    pub fn with_clock(max_capacity: u64, clock: Arc<dyn Clock>) -> Self {
        let inner = MokaCache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { inner, clock }
    }
}

#[async_trait]
impl Cache for MemoryCache {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let Some(entry) = self.inner.get(key) else {
            return Ok(None);
        };

        if entry.expires_at <= self.clock.now() {
            self.inner.invalidate(key);
            return Ok(None);
        }

        Ok(Some(entry.bytes.to_vec()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = self
            .clock
            .now()
            .checked_add(ttl)
            .ok_or(CacheError::InvalidTtl(ttl))?;
        let entry = Entry {
            bytes: value.into(),
            ttl,
            expires_at,
        };
        self.inner.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.inner.invalidate(key);
        Ok(())
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entry_count", &self.inner.entry_count())
            .field("clock", &self.clock)
            .finish()
    }
}
