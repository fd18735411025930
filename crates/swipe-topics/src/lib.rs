//! swipe-topics: stable display colors for paper topics.
//!
//! Every topic shown on a feed card gets a color from a fixed palette. The
//! first time a (normalized) topic is seen anywhere, a color is allocated and
//! written to a shared store; every later request, from any process, reads
//! the same color back. A per-instance cache keeps repeated lookups off the
//! store entirely.

pub mod assigner;
pub mod config;
pub mod palette;
pub mod store;

#[cfg(feature = "sqlite")]
pub mod sqlite_store;

pub use assigner::*;
pub use config::*;
pub use palette::*;
pub use store::*;

#[cfg(feature = "sqlite")]
pub use sqlite_store::SqliteTopicColorStore;
