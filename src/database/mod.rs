//! Database module exports.

mod models;
mod mongo;
mod repository;
mod store;

pub use models::{Movie, MoviePatch};
pub use mongo::Database;
pub use repository::MovieRepository;
pub use store::{MovieStore, StoreError};
