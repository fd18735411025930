//! swipe-feed: turns bibliographic API results into swipeable paper cards.
//!
//! A feed page is a batch of works from OpenAlex, each given a topic color
//! (through the shared [`swipe_topics::TopicColorAssigner`]) and a card
//! background that differs from the two cards before it. The local backend
//! ranks precomputed paper embeddings against a reader's interests instead.

pub mod assembler;
pub mod background;
pub mod error;
pub mod openalex;
pub mod paper;
pub mod ranking;

#[cfg(feature = "native")]
pub mod client;

pub use assembler::*;
pub use background::*;
pub use error::*;
pub use openalex::*;
pub use paper::*;
pub use ranking::*;

#[cfg(feature = "native")]
pub use client::OpenAlexClient;
