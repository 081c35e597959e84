//! Database models.

pub mod movie;

pub use movie::{Movie, MovieDocument, MoviePatch};
