//! Test fixture loading utilities

use std::path::PathBuf;
use std::sync::Arc;

use swipe_topics::{MemoryTopicColorStore, Palette, TopicColorAssigner};

/// Get the path to a fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_fixtures")
        .join(name)
}

/// Load a mock API response fixture
pub fn load_response_fixture(name: &str) -> String {
    let path = fixture_path(&format!("responses/{}", name));
    std::fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", path.display()))
}

/// An assigner over a fresh in-memory store with the default palette.
pub fn memory_assigner() -> Arc<TopicColorAssigner> {
    Arc::new(TopicColorAssigner::new(
        Arc::new(MemoryTopicColorStore::new()),
        Palette::default(),
    ))
}
