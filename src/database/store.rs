//! The store capability: durable, authoritative movie records.

use async_trait::async_trait;
use thiserror::Error;

use super::models::{Movie, MoviePatch};

/// Failures reported by the store. Both are surfaced to the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The identified record does not exist.
    #[error("Movie not found")]
    NotFound,

    /// The store could not be reached or rejected the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Keyed movie repository. Source of truth for every cache entry.
#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn get_by_id(&self, id: &str) -> Result<Movie, StoreError>;

    /// First `limit` records in the store's natural order.
    async fn get_page(&self, limit: i64) -> Result<Vec<Movie>, StoreError>;

    /// Apply `patch` and return the record as it is after the update.
    async fn update_by_id(&self, id: &str, patch: &MoviePatch) -> Result<Movie, StoreError>;

    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError>;
}
