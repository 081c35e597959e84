//! Test doubles for the store and cache capabilities.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::cache::{Cache, CacheError, Clock};
use crate::database::{Movie, MoviePatch, MovieStore, StoreError};

pub fn movie(id: &str, title: &str, year: i32) -> Movie {
    Movie {
        id: id.to_string(),
        title: title.to_string(),
        year: Some(year),
    }
}

/// In-memory store that counts reads. Listing order is by id.
#[derive(Default)]
pub struct MemoryStore {
    movies: DashMap<String, Movie>,
    reads: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn with_movies(movies: impl IntoIterator<Item = Movie>) -> Self {
        let store = Self::default();
        for movie in movies {
            store.insert(movie);
        }
        store
    }

    pub fn insert(&self, movie: Movie) {
        self.movies.insert(movie.id.clone(), movie);
    }

    /// Number of `get_by_id` and `get_page` calls so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Make every call fail with `StoreError::Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MovieStore for MemoryStore {
    async fn get_by_id(&self, id: &str) -> Result<Movie, StoreError> {
        self.check()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.movies
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NotFound)
    }

    async fn get_page(&self, limit: i64) -> Result<Vec<Movie>, StoreError> {
        self.check()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        let mut movies: Vec<Movie> = self.movies.iter().map(|entry| entry.value().clone()).collect();
        movies.sort_by(|a, b| a.id.cmp(&b.id));
        movies.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(movies)
    }

    async fn update_by_id(&self, id: &str, patch: &MoviePatch) -> Result<Movie, StoreError> {
        self.check()?;
        let mut entry = self.movies.get_mut(id).ok_or(StoreError::NotFound)?;
        if let Some(title) = &patch.title {
            entry.title = title.clone();
        }
        if let Some(year) = patch.year {
            entry.year = Some(year);
        }
        Ok(entry.value().clone())
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        self.check()?;
        self.movies.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

/// Cache whose every call fails, as if Redis were down.
pub struct FailingCache;

#[async_trait]
impl Cache for FailingCache {
    fn name(&self) -> &str {
        "failing"
    }

    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }
}

/// Cache that serves reads and deletes but rejects every write, like Redis
/// refusing SET at its memory limit.
pub struct WriteRejectingCache {
    entries: DashMap<String, Vec<u8>>,
}

impl WriteRejectingCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Place an entry directly, bypassing `set`.
    pub fn seed(&self, key: &str, value: Vec<u8>) {
        self.entries.insert(key.to_string(), value);
    }
}

#[async_trait]
impl Cache for WriteRejectingCache {
    fn name(&self) -> &str {
        "write-rejecting"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::unavailable("OOM command not allowed when used memory > 'maxmemory'"))
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Cache that hangs for `delay` before answering each call.
pub struct SlowCache {
    delay: Duration,
}

impl SlowCache {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Cache for SlowCache {
    fn name(&self) -> &str {
        "slow"
    }

    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        tokio::time::sleep(self.delay).await;
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}
