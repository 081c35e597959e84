//! Cache module - the ephemeral key-value capability.
//!
//! The coordinator only ever talks to a `dyn Cache`, so the backing store
//! can be swapped without touching request handling:
//!
//! - `RedisCache` - shared cache over a `deadpool-redis` pool
//! - `MemoryCache` - in-process cache using Moka, per-entry TTL
//! - no cache at all (`CacheBackend::None`), the service runs against the store only
//!
//! Values are opaque bytes. Entries may disappear at any time; nothing here
//! is authoritative.

mod clock;
mod config;
mod memory;
mod redis_cache;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

pub use clock::{Clock, SystemClock};
pub use config::{CacheBackend, CacheConfig};
pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

/// Failures raised by a cache backend.
///
/// None of these are ever surfaced to a client; see `CacheGuard`.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    #[error("cache operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("ttl of {0:?} is out of range")]
    InvalidTtl(Duration),

    #[error("cached value could not be encoded or decoded: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Key-value capability with per-key time-to-live.
///
/// Implementations must be safe to call concurrently; each call is atomic
/// per key.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Backend name, used in log fields.
    fn name(&self) -> &str;

    /// Get the bytes stored at `key`, `None` on a miss or expired entry.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store `value` at `key`, replacing any previous entry.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// Build the configured cache backend.
///
/// Returns `Ok(None)` when caching is turned off.
pub fn connect(config: &CacheConfig) -> Result<Option<Arc<dyn Cache>>, CacheError> {
    let cache: Arc<dyn Cache> = match config.backend {
        CacheBackend::None => {
            info!("Cache disabled, serving every request from the store");
            return Ok(None);
        }
        CacheBackend::Memory => Arc::new(MemoryCache::new(config.max_capacity)),
        CacheBackend::Redis => Arc::new(RedisCache::from_url(&config.redis_url)?),
    };

    info!(
        "Cache backend: {} (ttl {:?}, timeout {:?})",
        cache.name(),
        config.ttl,
        config.op_timeout
    );
    Ok(Some(cache))
}
