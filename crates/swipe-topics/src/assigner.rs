//! Topic color assignment.
//!
//! Lookup order: instance cache, then the shared store, then allocation of
//! the first unused palette color. Allocation is not atomic across
//! processes; a lost insert race surfaces as [`StoreError::DuplicateTopic`]
//! and is settled by re-reading the winning row.
//!
//! The assigner never fails. Store faults degrade to the palette's default
//! color, and the [`AssignOutcome`] says which path produced the answer.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{ConfigError, SwipeConfig};
use crate::palette::{normalize_topic, Palette, TopicColor};
use crate::store::{StoreError, TopicColorEntry, TopicColorStore};

/// How an assignment was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignOutcome {
    /// Empty topic; nothing was looked up.
    Default,
    /// Served from this assigner's cache.
    Cached,
    /// Read from the store.
    Stored,
    /// A new row was written by this call.
    Allocated,
    /// Another writer inserted the topic first; its color was adopted.
    Adopted,
    /// A store fault forced the default color, or the chosen color could
    /// not be persisted and was returned uncached.
    Fallback,
}

/// A color together with the path that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub color: TopicColor,
    pub outcome: AssignOutcome,
}

impl Assignment {
    fn new(color: TopicColor, outcome: AssignOutcome) -> Self {
        Self { color, outcome }
    }
}

/// Assigns stable display colors to topics.
///
/// Each instance owns its cache; create one per rendering context and share
/// it through an `Arc`. Dropping the assigner drops the cache, the store is
/// untouched.
pub struct TopicColorAssigner {
    store: Arc<dyn TopicColorStore>,
    palette: Palette,
    cache: RwLock<HashMap<String, TopicColor>>,
    timeout: Option<Duration>,
}

impl TopicColorAssigner {
    /// Create an assigner with an empty cache.
    pub fn new(store: Arc<dyn TopicColorStore>, palette: Palette) -> Self {
        Self {
            store,
            palette,
            cache: RwLock::new(HashMap::new()),
            timeout: None,
        }
    }

    /// Create an assigner using the configured palette and store timeout.
    pub fn from_config(
        store: Arc<dyn TopicColorStore>,
        config: &SwipeConfig,
    ) -> Result<Self, ConfigError> {
        let palette = config.palette()?;
        Ok(Self::new(store, palette).with_timeout(config.store.timeout()))
    }

    /// Bound every store call; a call that runs longer counts as a fault.
    ///
    /// Requires a Tokio runtime with the time driver enabled.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn store(&self) -> &Arc<dyn TopicColorStore> {
        &self.store
    }

    /// Color for `topic`, never failing.
    pub async fn assign_color(&self, topic: Option<&str>) -> TopicColor {
        self.assign(topic).await.color
    }

    /// Color for `topic` plus the path that produced it.
    pub async fn assign(&self, topic: Option<&str>) -> Assignment {
        let Some(key) = topic.and_then(normalize_topic) else {
            return self.fallback(AssignOutcome::Default);
        };

        if let Some(color) = self.cached(&key) {
            return Assignment::new(color, AssignOutcome::Cached);
        }

        match self.guarded(self.store.find_color(&key)).await {
            Ok(Some(color)) => {
                debug!(topic = %key, %color, "topic color loaded from store");
                self.remember(&key, &color);
                return Assignment::new(color, AssignOutcome::Stored);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(topic = %key, error = %e, "topic color lookup failed, treating as new topic");
            }
        }

        self.allocate(key).await
    }

    /// Cached color for a topic, without touching the store.
    pub fn cached(&self, topic: &str) -> Option<TopicColor> {
        let key = normalize_topic(topic)?;
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    /// Number of cached topics.
    pub fn cache_len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Forget every cached mapping. The store keeps its rows.
    pub fn clear_cache(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    async fn allocate(&self, key: String) -> Assignment {
        let used = match self.guarded(self.store.used_colors()).await {
            Ok(used) => used,
            Err(e) => {
                // Never allocate without knowing which colors are taken.
                warn!(topic = %key, error = %e, "could not read used colors, using default");
                return self.fallback(AssignOutcome::Fallback);
            }
        };

        let color = match self.palette.first_unused(&used) {
            Some(color) => color.clone(),
            None => {
                debug!(topic = %key, "palette exhausted, reusing default color");
                self.palette.default_color().clone()
            }
        };

        let entry = TopicColorEntry::new(key.clone(), color.clone());
        match self.guarded(self.store.insert(entry)).await {
            Ok(()) => {
                debug!(topic = %key, %color, "allocated topic color");
                self.remember(&key, &color);
                Assignment::new(color, AssignOutcome::Allocated)
            }
            Err(StoreError::DuplicateTopic(_)) => self.adopt(&key).await,
            Err(e) => {
                warn!(topic = %key, error = %e, "could not persist topic color, not caching it");
                Assignment::new(color, AssignOutcome::Fallback)
            }
        }
    }

    /// Settle a lost insert race by reading the row that won.
    async fn adopt(&self, key: &str) -> Assignment {
        match self.guarded(self.store.find_color(key)).await {
            Ok(Some(color)) => {
                debug!(topic = %key, %color, "adopted concurrently assigned topic color");
                self.remember(key, &color);
                Assignment::new(color, AssignOutcome::Adopted)
            }
            Ok(None) => {
                warn!(topic = %key, "duplicate topic reported but no row found");
                self.fallback(AssignOutcome::Fallback)
            }
            Err(e) => {
                warn!(topic = %key, error = %e, "re-read after duplicate insert failed");
                self.fallback(AssignOutcome::Fallback)
            }
        }
    }

    fn remember(&self, key: &str, color: &TopicColor) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), color.clone());
    }

    fn fallback(&self, outcome: AssignOutcome) -> Assignment {
        Assignment::new(self.palette.default_color().clone(), outcome)
    }

    async fn guarded<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or_else(|_| Err(StoreError::Timeout(limit.as_millis() as u64))),
            None => call.await,
        }
    }
}
