//! Movie repository.
//!
//! MongoDB implementation of `MovieStore`. No caching happens here; that is
//! the coordinator's job.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::options::{FindOneAndUpdateOptions, FindOneOptions, FindOptions, ReturnDocument};
use mongodb::Collection;
use tracing::debug;

use crate::database::models::movie::MOVIE_PROJECTION;
use crate::database::models::{Movie, MovieDocument, MoviePatch};
use crate::database::store::{MovieStore, StoreError};
use crate::database::Database;

/// Repository for movies.
pub struct MovieRepository {
    collection: Collection<MovieDocument>,
}

impl MovieRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.movies(),
        }
    }
}

/// A string that is not an ObjectId cannot name a stored movie.
fn parse_id(id: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(id).map_err(|_| StoreError::NotFound)
}

fn projection() -> Document {
    MOVIE_PROJECTION.iter().map(|field| (field.to_string(), Bson::Int32(1))).collect()
}

#[async_trait]
impl MovieStore for MovieRepository {
    async fn get_by_id(&self, id: &str) -> Result<Movie, StoreError> {
        let oid = parse_id(id)?;
        let options = FindOneOptions::builder().projection(projection()).build();

        let result = self
            .collection
            .find_one(doc! { "_id": oid })
            .with_options(options)
            .await?;

        debug!("DB get movie {}: {:?}", id, result.is_some());
        result.map(Movie::from).ok_or(StoreError::NotFound)
    }

    async fn get_page(&self, limit: i64) -> Result<Vec<Movie>, StoreError> {
        let options = FindOptions::builder()
            .limit(limit)
            .projection(projection())
            .build();

        let mut cursor = self.collection.find(doc! {}).with_options(options).await?;
        let mut movies = Vec::new();

        while let Some(document) = cursor.try_next().await? {
            movies.push(Movie::from(document));
        }

        debug!("DB listed {} movies", movies.len());
        Ok(movies)
    }

    async fn update_by_id(&self, id: &str, patch: &MoviePatch) -> Result<Movie, StoreError> {
        // `$set: {}` is rejected by the server
        if patch.is_empty() {
            return self.get_by_id(id).await;
        }

        let oid = parse_id(id)?;
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .projection(projection())
            .build();

        let result = self
            .collection
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": patch.to_set_document() })
            .with_options(options)
            .await?;

        debug!("DB update movie {}: {:?}", id, result.is_some());
        result.map(Movie::from).ok_or(StoreError::NotFound)
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        let oid = parse_id(id)?;
        let result = self.collection.delete_one(doc! { "_id": oid }).await?;

        debug!("DB delete movie {}: {}", id, result.deleted_count > 0);
        if result.deleted_count == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
