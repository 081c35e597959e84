//! Repository module - MongoDB implementations of the store capability.

mod movie_repository;

pub use movie_repository::MovieRepository;
