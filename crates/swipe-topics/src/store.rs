//! The persisted topic -> color mapping.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::palette::TopicColor;

/// One row of the shared mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicColorEntry {
    /// Normalized topic, unique across the store.
    pub topic: String,
    pub color: TopicColor,
    pub created_at: DateTime<Utc>,
}

impl TopicColorEntry {
    pub fn new(topic: impl Into<String>, color: TopicColor) -> Self {
        Self {
            topic: topic.into(),
            color,
            created_at: Utc::now(),
        }
    }
}

/// Errors from a topic color store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The topic already has a row. Insert lost a race or repeated itself.
    #[error("Topic already has a color: {0}")]
    DuplicateTopic(String),

    #[error("Store call timed out after {0} ms")]
    Timeout(u64),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Storage backend for the topic -> color mapping.
///
/// Implementations must reject a second row for the same topic with
/// [`StoreError::DuplicateTopic`]; the assigner relies on that to settle
/// concurrent first sightings.
#[async_trait]
pub trait TopicColorStore: Send + Sync {
    /// Point lookup by normalized topic.
    async fn find_color(&self, topic: &str) -> Result<Option<TopicColor>, StoreError>;

    /// Every color currently assigned to some topic.
    async fn used_colors(&self) -> Result<HashSet<TopicColor>, StoreError>;

    /// Insert a new row. Never overwrites.
    async fn insert(&self, entry: TopicColorEntry) -> Result<(), StoreError>;

    /// All rows, ordered by topic.
    async fn entries(&self) -> Result<Vec<TopicColorEntry>, StoreError>;
}

/// Process-local store, keyed by topic.
#[derive(Debug, Default)]
pub struct MemoryTopicColorStore {
    rows: Mutex<BTreeMap<String, TopicColorEntry>>,
}

impl MemoryTopicColorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, TopicColorEntry>>, StoreError> {
        self.rows
            .lock()
            .map_err(|e| StoreError::Storage(format!("Mutex poisoned: {}", e)))
    }
}

#[async_trait]
impl TopicColorStore for MemoryTopicColorStore {
    async fn find_color(&self, topic: &str) -> Result<Option<TopicColor>, StoreError> {
        Ok(self.lock()?.get(topic).map(|e| e.color.clone()))
    }

    async fn used_colors(&self) -> Result<HashSet<TopicColor>, StoreError> {
        Ok(self.lock()?.values().map(|e| e.color.clone()).collect())
    }

    async fn insert(&self, entry: TopicColorEntry) -> Result<(), StoreError> {
        let mut rows = self.lock()?;
        if rows.contains_key(&entry.topic) {
            return Err(StoreError::DuplicateTopic(entry.topic));
        }
        rows.insert(entry.topic.clone(), entry);
        Ok(())
    }

    async fn entries(&self) -> Result<Vec<TopicColorEntry>, StoreError> {
        Ok(self.lock()?.values().cloned().collect())
    }
}
