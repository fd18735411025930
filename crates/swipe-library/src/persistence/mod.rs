//! Persistence layer for the reader library
//!
//! Provides SQLite-backed storage for liked papers, profiles and interests.

mod repository;
mod schema;

pub use repository::Repository;
pub use schema::{Schema, SCHEMA_VERSION};
