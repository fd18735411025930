//! Error types for swipe-feed

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Request failed: {0}")]
    Http(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Parse(err.to_string())
    }
}
