//! Redis cache backend.
//!
//! Values are stored as plain strings under their cache key with `SET ... EX`,
//! so expiry is owned by Redis.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Config, Connection, Pool, Runtime};
use redis::AsyncCommands;

use super::{Cache, CacheError};

/// Redis-backed cache over a `deadpool-redis` connection pool.
///
/// The pool connects lazily, so a Redis server that is down at startup only
/// shows up as `CacheError::Unavailable` on individual calls.
#[derive(Clone)]
pub struct RedisCache {
    pool: Pool,
}

impl RedisCache {
    /// Create a cache from a Redis URL.
    ///
    /// # Errors
    /// Returns `CacheError::Unavailable` if the pool cannot be configured.
    pub fn from_url(redis_url: &str) -> Result<Self, CacheError> {
        let pool = Config::from_url(redis_url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(CacheError::unavailable)?;

        Ok(Self { pool })
    }

    async fn connection(&self) -> Result<Connection, CacheError> {
        self.pool.get().await.map_err(CacheError::unavailable)
    }
}

/// Redis expiry has whole-second resolution and rejects zero.
fn expiry_secs(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}

#[async_trait]
impl Cache for RedisCache {
    fn name(&self) -> &str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut connection = self.connection().await?;
        connection.get(key).await.map_err(CacheError::unavailable)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let mut connection = self.connection().await?;
        connection
            .set_ex::<_, _, ()>(key, value, expiry_secs(ttl))
            .await
            .map_err(CacheError::unavailable)
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut connection = self.connection().await?;
        connection
            .del::<_, ()>(key)
            .await
            .map_err(CacheError::unavailable)
    }
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("RedisCache")
            .field("pool_size", &status.size)
            .field("pool_available", &status.available)
            .finish()
    }
}
