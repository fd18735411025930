//! Store wrappers that count, fail, or stall calls to a real store.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use swipe_topics::{StoreError, TopicColor, TopicColorEntry, TopicColorStore};
use tokio::sync::Barrier;

pub fn color(s: &str) -> TopicColor {
    TopicColor::parse(s).unwrap()
}

/// Counts every call that reaches the inner store.
pub struct CountingStore {
    pub inner: Arc<dyn TopicColorStore>,
    pub finds: AtomicUsize,
    pub scans: AtomicUsize,
    pub inserts: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: Arc<dyn TopicColorStore>) -> Self {
        Self {
            inner,
            finds: AtomicUsize::new(0),
            scans: AtomicUsize::new(0),
            inserts: AtomicUsize::new(0),
        }
    }

    pub fn total(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
            + self.scans.load(Ordering::SeqCst)
            + self.inserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TopicColorStore for CountingStore {
    async fn find_color(&self, topic: &str) -> Result<Option<TopicColor>, StoreError> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.inner.find_color(topic).await
    }

    async fn used_colors(&self) -> Result<HashSet<TopicColor>, StoreError> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.inner.used_colors().await
    }

    async fn insert(&self, entry: TopicColorEntry) -> Result<(), StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(entry).await
    }

    async fn entries(&self) -> Result<Vec<TopicColorEntry>, StoreError> {
        self.inner.entries().await
    }
}

/// Fails selected operations with a storage error.
pub struct FaultyStore {
    pub inner: Arc<dyn TopicColorStore>,
    pub fail_find: AtomicBool,
    pub fail_scan: AtomicBool,
    pub fail_insert: AtomicBool,
}

impl FaultyStore {
    pub fn new(inner: Arc<dyn TopicColorStore>) -> Self {
        Self {
            inner,
            fail_find: AtomicBool::new(false),
            fail_scan: AtomicBool::new(false),
            fail_insert: AtomicBool::new(false),
        }
    }
}

fn unreachable_store() -> StoreError {
    StoreError::Storage("connection refused".to_string())
}

#[async_trait]
impl TopicColorStore for FaultyStore {
    async fn find_color(&self, topic: &str) -> Result<Option<TopicColor>, StoreError> {
        if self.fail_find.load(Ordering::SeqCst) {
            return Err(unreachable_store());
        }
        self.inner.find_color(topic).await
    }

    async fn used_colors(&self) -> Result<HashSet<TopicColor>, StoreError> {
        if self.fail_scan.load(Ordering::SeqCst) {
            return Err(unreachable_store());
        }
        self.inner.used_colors().await
    }

    async fn insert(&self, entry: TopicColorEntry) -> Result<(), StoreError> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(unreachable_store());
        }
        self.inner.insert(entry).await
    }

    async fn entries(&self) -> Result<Vec<TopicColorEntry>, StoreError> {
        self.inner.entries().await
    }
}

/// Holds every `used_colors` caller until `parties` callers have arrived,
/// so they all compute an allocation from the same snapshot.
pub struct BarrierStore {
    pub inner: Arc<dyn TopicColorStore>,
    barrier: Arc<Barrier>,
}

impl BarrierStore {
    pub fn new(inner: Arc<dyn TopicColorStore>, parties: usize) -> Self {
        Self::with_barrier(inner, Arc::new(Barrier::new(parties)))
    }

    /// Share one barrier between stores opened by different "processes".
    pub fn with_barrier(inner: Arc<dyn TopicColorStore>, barrier: Arc<Barrier>) -> Self {
        Self { inner, barrier }
    }
}

#[async_trait]
impl TopicColorStore for BarrierStore {
    async fn find_color(&self, topic: &str) -> Result<Option<TopicColor>, StoreError> {
        self.inner.find_color(topic).await
    }

    async fn used_colors(&self) -> Result<HashSet<TopicColor>, StoreError> {
        let used = self.inner.used_colors().await;
        self.barrier.wait().await;
        used
    }

    async fn insert(&self, entry: TopicColorEntry) -> Result<(), StoreError> {
        self.inner.insert(entry).await
    }

    async fn entries(&self) -> Result<Vec<TopicColorEntry>, StoreError> {
        self.inner.entries().await
    }
}

/// Answers the first point lookup with "not found", as if the read had
/// happened just before another writer committed.
pub struct StaleFirstFind {
    pub inner: Arc<dyn TopicColorStore>,
    stale: AtomicBool,
}

impl StaleFirstFind {
    pub fn new(inner: Arc<dyn TopicColorStore>) -> Self {
        Self {
            inner,
            stale: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl TopicColorStore for StaleFirstFind {
    async fn find_color(&self, topic: &str) -> Result<Option<TopicColor>, StoreError> {
        if self.stale.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.find_color(topic).await
    }

    async fn used_colors(&self) -> Result<HashSet<TopicColor>, StoreError> {
        self.inner.used_colors().await
    }

    async fn insert(&self, entry: TopicColorEntry) -> Result<(), StoreError> {
        self.inner.insert(entry).await
    }

    async fn entries(&self) -> Result<Vec<TopicColorEntry>, StoreError> {
        self.inner.entries().await
    }
}

/// Delays every call by a fixed amount.
pub struct SlowStore {
    pub inner: Arc<dyn TopicColorStore>,
    pub delay: Duration,
}

#[async_trait]
impl TopicColorStore for SlowStore {
    async fn find_color(&self, topic: &str) -> Result<Option<TopicColor>, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.find_color(topic).await
    }

    async fn used_colors(&self) -> Result<HashSet<TopicColor>, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.used_colors().await
    }

    async fn insert(&self, entry: TopicColorEntry) -> Result<(), StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.insert(entry).await
    }

    async fn entries(&self) -> Result<Vec<TopicColorEntry>, StoreError> {
        self.inner.entries().await
    }
}
