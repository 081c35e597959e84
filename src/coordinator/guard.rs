//! Cache error absorption.
//!
//! All calls from the coordinator to the cache go through `CacheGuard`.
//! It bounds each call with a timeout and turns every `CacheError` into a
//! logged miss (reads) or no-op (writes). This is the only place cache
//! failures are handled.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::warn;

use crate::cache::{Cache, CacheError};

/// Cache operation, for log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOp {
    Get,
    Set,
    Delete,
    Decode,
    Encode,
}

impl fmt::Display for CacheOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "get",
            Self::Set => "set",
            Self::Delete => "delete",
            Self::Decode => "decode",
            Self::Encode => "encode",
        };
        f.write_str(name)
    }
}

/// Best-effort front for an optional cache.
#[derive(Clone)]
pub struct CacheGuard {
    cache: Option<Arc<dyn Cache>>,
    timeout: Duration,
}

impl CacheGuard {
    pub fn new(cache: Option<Arc<dyn Cache>>, timeout: Duration) -> Self {
        Self { cache, timeout }
    }

    /// Probe `key`. Errors, timeouts and a missing cache all read as a miss.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let cache = self.cache.as_ref()?;
        self.bounded(CacheOp::Get, key, cache.get(key)).await.flatten()
    }

    /// Store `value` at `key`. Returns whether the cache accepted it.
    pub async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> bool {
        match &self.cache {
            Some(cache) => self
                .bounded(CacheOp::Set, key, cache.set(key, value, ttl))
                .await
                .is_some(),
            None => false,
        }
    }

    pub async fn delete(&self, key: &str) {
        if let Some(cache) = &self.cache {
            self.bounded(CacheOp::Delete, key, cache.delete(key)).await;
        }
    }

    async fn bounded<T, F>(&self, op: CacheOp, key: &str, call: F) -> Option<T>
    where
        F: Future<Output = Result<T, CacheError>>,
    {
        let result = match timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout(self.timeout)),
        };
        absorb(op, key, result)
    }
}

impl fmt::Debug for CacheGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheGuard")
            .field("backend", &self.cache.as_ref().map(|cache| cache.name().to_string()))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Classify a cache result. Every error is logged and dropped; a request
/// never fails because of the cache.
pub fn absorb<T>(op: CacheOp, key: &str, result: Result<T, CacheError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            let kind = match &err {
                CacheError::Unavailable(_) => "unavailable",
                CacheError::Timeout(_) => "timeout",
                CacheError::InvalidTtl(_) => "invalid_ttl",
                CacheError::Serialization(_) => "serialization",
            };
            warn!(%op, key, kind, error = %err, "Cache error absorbed, continuing against store");
            None
        }
    }
}
