//! Access coordinator - cache-aside reads and write-through mutations.
//!
//! ## Read path
//!
//! Probe the cache, on a miss fetch from the store and populate the cache.
//! A bypassed read goes straight to the store and leaves the cache alone.
//!
//! ## Write path
//!
//! The store write always happens first. Only after it succeeds is the
//! cache refreshed (update) or invalidated (delete), so a successful
//! mutation never leaves behind an entry it knows to be stale. The listing
//! key is invalidated on every successful mutation since any write can change
//! what the first page shows.
//!
//! ## Concurrency
//!
//! There is no locking here. Two concurrent misses on one key both fetch and
//! both populate (no single-flight), and a populate carrying pre-update data
//! can land after an update's write-through. Such an entry lives at most one
//! TTL. That window is accepted to keep the cache non-blocking.

mod guard;
mod keys;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::cache::{Cache, CacheConfig, CacheError};
use crate::database::{Movie, MoviePatch, MovieStore, StoreError};

pub use guard::{absorb, CacheGuard, CacheOp};
pub use keys::CacheKey;

/// Where a read was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Store,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Store => "store",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value together with the place it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Sourced<T> {
    pub fn cache(value: T) -> Self {
        Self {
            value,
            source: Source::Cache,
        }
    }

    pub fn store(value: T) -> Self {
        Self {
            value,
            source: Source::Store,
        }
    }
}

/// Sits between request handlers and the store/cache capabilities.
///
/// Holds no mutable state of its own; safe to share behind an `Arc`.
pub struct AccessCoordinator {
    store: Arc<dyn MovieStore>,
    cache: CacheGuard,
    ttl: Duration,
    listing_limit: i64,
}

impl AccessCoordinator {
    pub fn new(
        store: Arc<dyn MovieStore>,
        cache: Option<Arc<dyn Cache>>,
        config: &CacheConfig,
        listing_limit: i64,
    ) -> Self {
        Self {
            store,
            cache: CacheGuard::new(cache, config.op_timeout),
            ttl: config.ttl,
            listing_limit,
        }
    }

    /// Cache-aside read of any serializable query result.
    ///
    /// `fetch` is only called on a miss or a bypass. A store error, including
    /// `NotFound`, is returned as-is and nothing is cached for it.
    pub async fn get<T, F, Fut>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        bypass: bool,
        fetch: F,
    ) -> Result<Sourced<T>, StoreError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let key = key.to_string();

        if bypass {
            debug!("Cache bypass for {}", key);
            return fetch().await.map(Sourced::store);
        }

        if let Some(bytes) = self.cache.get(&key).await {
            let decoded = serde_json::from_slice::<T>(&bytes).map_err(CacheError::from);
            if let Some(value) = absorb(CacheOp::Decode, &key, decoded) {
                debug!("Cache hit for {}", key);
                return Ok(Sourced::cache(value));
            }
        }

        debug!("Cache miss for {}", key);
        let value = fetch().await?;
        self.write(&key, &value, ttl).await;
        Ok(Sourced::store(value))
    }

    /// Get one movie by id.
    pub async fn movie(&self, id: &str, bypass: bool) -> Result<Sourced<Movie>, StoreError> {
        self.get(&CacheKey::movie(id), self.ttl, bypass, || self.store.get_by_id(id))
            .await
    }

    /// Get the first page of movies.
    pub async fn movies(&self, bypass: bool) -> Result<Sourced<Vec<Movie>>, StoreError> {
        let limit = self.listing_limit;
        self.get(&CacheKey::movie_listing(limit), self.ttl, bypass, || {
            self.store.get_page(limit)
        })
        .await
    }

    /// Update a movie in the store, then write the new record through to
    /// the cache.
    ///
    /// A bypassed update skips the write-through but still drops the old
    /// entry, so it cannot be served afterwards. The same happens when the
    /// write-through is rejected by the cache.
    pub async fn update_movie(
        &self,
        id: &str,
        patch: &MoviePatch,
        bypass: bool,
    ) -> Result<Movie, StoreError> {
        let movie = self.store.update_by_id(id, patch).await?;

        let key = CacheKey::movie(id).to_string();
        if bypass || !self.write(&key, &movie, self.ttl).await {
            self.cache.delete(&key).await;
        }
        self.invalidate_listing().await;

        Ok(movie)
    }

    /// Delete a movie from the store, then invalidate its cache entry.
    ///
    /// The store deletion is what counts: once it has committed the call
    /// succeeds whatever happens to the cache.
    pub async fn delete_movie(&self, id: &str, bypass: bool) -> Result<(), StoreError> {
        self.store.delete_by_id(id).await?;

        if bypass {
            debug!("Bypassed delete of {}, invalidating anyway", id);
        }
        self.cache.delete(&CacheKey::movie(id).to_string()).await;
        self.invalidate_listing().await;

        Ok(())
    }

    async fn invalidate_listing(&self) {
        let key = CacheKey::movie_listing(self.listing_limit).to_string();
        self.cache.delete(&key).await;
    }

    /// Encode and store `value`. Returns whether it reached the cache.
    async fn write<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> bool {
        let encoded = serde_json::to_vec(value).map_err(CacheError::from);
        match absorb(CacheOp::Encode, key, encoded) {
            Some(bytes) => self.cache.set(key, bytes, ttl).await,
            None => false,
        }
    }
}

impl fmt::Debug for AccessCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessCoordinator")
            .field("cache", &self.cache)
            .field("ttl", &self.ttl)
            .field("listing_limit", &self.listing_limit)
            .finish()
    }
}
