//! swipe-library: what a reader keeps from the feed.
//!
//! Liked papers are stored per user with the card's topic, color and
//! background so the saved view looks like the feed did. A profile records
//! research fields with a familiarity level plus free-form skills; the
//! ranked feed reads the flat interest list kept alongside it.

pub mod error;
pub mod model;
pub mod persistence;

pub use error::{LibraryError, Result};
pub use model::*;
pub use persistence::{Repository, Schema, SCHEMA_VERSION};
