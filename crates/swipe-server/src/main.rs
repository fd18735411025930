//! Swipe Server Binary
//!
//! Standalone local backend for the paper feed.

use std::path::PathBuf;
use std::sync::Arc;

use swipe_server::{serve, AppState};
use swipe_topics::SwipeConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = SwipeConfig::load_standard()?;
    if let Ok(addr) = std::env::var("PAPERSWIPE_ADDR") {
        config.server.addr = addr;
    }
    if let Ok(db) = std::env::var("PAPERSWIPE_DB") {
        config.store.database_path = Some(PathBuf::from(db));
    }

    let state = Arc::new(AppState::from_config(&config)?);
    serve(&config.server.addr, state).await
}
