use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{ffi, params, Connection, OptionalExtension};

use crate::palette::TopicColor;
use crate::store::{StoreError, TopicColorEntry, TopicColorStore};

/// How long a connection waits on another process's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed implementation of the TopicColorStore trait.
///
/// Several processes may open the same database file. The `UNIQUE`
/// constraint on `topic` is what keeps one color per topic when they race.
///
/// Every statement runs on the blocking pool, so a caller's timeout can give
/// up on a statement stuck behind another writer's lock. The abandoned
/// statement still finishes (or hits the busy timeout) in the background.
pub struct SqliteTopicColorStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTopicColorStore {
    /// Open (or create) a database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::open_with_busy_timeout(path, BUSY_TIMEOUT)
    }

    /// Open a database whose connection waits at most `busy_timeout` for
    /// another writer's lock.
    pub fn open_with_busy_timeout(path: &Path, busy_timeout: Duration) -> Result<Self, StoreError> {
        let conn =
            Connection::open(path).map_err(|e| StoreError::Storage(format!("open: {}", e)))?;
        Self::init_with_connection(conn, busy_timeout)
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Storage(format!("open_in_memory: {}", e)))?;
        Self::init_with_connection(conn, BUSY_TIMEOUT)
    }

    fn init_with_connection(conn: Connection, busy_timeout: Duration) -> Result<Self, StoreError> {
        conn.busy_timeout(busy_timeout)
            .map_err(|e| StoreError::Storage(format!("busy_timeout: {}", e)))?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;

            CREATE TABLE IF NOT EXISTS topic_colors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                topic TEXT NOT NULL UNIQUE,
                color TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_topic_colors_color ON topic_colors(color);
            ",
        )
        .map_err(|e| StoreError::Storage(format!("init_schema: {}", e)))
    }

    #[cfg(test)]
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Storage(format!("Mutex poisoned: {}", e)))
    }

    /// Run `op` against the connection on the blocking pool.
    async fn with_connection<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|e| StoreError::Storage(format!("Mutex poisoned: {}", e)))?;
            op(&guard)
        })
        .await
        .map_err(|e| StoreError::Storage(format!("spawn_blocking failed: {}", e)))?
    }
}

fn find_color(conn: &Connection, topic: &str) -> Result<Option<TopicColor>, StoreError> {
    let stored: Option<String> = conn
        .query_row(
            "SELECT color FROM topic_colors WHERE topic = ?1",
            params![topic],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| StoreError::Storage(format!("find_color: {}", e)))?;

    stored
        .map(|c| TopicColor::parse(&c).map_err(|e| StoreError::Storage(e.to_string())))
        .transpose()
}

fn used_colors(conn: &Connection) -> Result<HashSet<TopicColor>, StoreError> {
    let mut stmt = conn
        .prepare("SELECT DISTINCT color FROM topic_colors")
        .map_err(|e| StoreError::Storage(format!("used_colors: {}", e)))?;
    let colors = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| StoreError::Storage(format!("used_colors: {}", e)))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError::Storage(format!("used_colors: {}", e)))?;

    // Rows written by hand with a malformed color can never match a
    // palette entry, so they do not count as used.
    Ok(colors
        .iter()
        .filter_map(|c| TopicColor::parse(c).ok())
        .collect())
}

fn insert(conn: &Connection, entry: &TopicColorEntry) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO topic_colors (topic, color, created_at) VALUES (?1, ?2, ?3)",
        params![entry.topic, entry.color.as_str(), entry.created_at],
    )
    .map_err(|e| insert_error(e, &entry.topic))?;
    Ok(())
}

/// Only a clash on the unique topic key means another writer got there
/// first. Any other constraint failure is a storage fault.
fn insert_error(err: rusqlite::Error, topic: &str) -> StoreError {
    if let rusqlite::Error::SqliteFailure(ref failure, _) = err {
        if failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE {
            return StoreError::DuplicateTopic(topic.to_string());
        }
    }
    StoreError::Storage(format!("insert: {}", err))
}

fn entries(conn: &Connection) -> Result<Vec<TopicColorEntry>, StoreError> {
    let mut stmt = conn
        .prepare("SELECT topic, color, created_at FROM topic_colors ORDER BY topic")
        .map_err(|e| StoreError::Storage(format!("entries: {}", e)))?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, DateTime<Utc>>(2)?,
            ))
        })
        .map_err(|e| StoreError::Storage(format!("entries: {}", e)))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError::Storage(format!("entries: {}", e)))?;

    rows.into_iter()
        .map(|(topic, color, created_at)| {
            let color =
                TopicColor::parse(&color).map_err(|e| StoreError::Storage(e.to_string()))?;
            Ok(TopicColorEntry {
                topic,
                color,
                created_at,
            })
        })
        .collect()
}

#[async_trait]
impl TopicColorStore for SqliteTopicColorStore {
    async fn find_color(&self, topic: &str) -> Result<Option<TopicColor>, StoreError> {
        let topic = topic.to_string();
        self.with_connection(move |conn| find_color(conn, &topic)).await
    }

    async fn used_colors(&self) -> Result<HashSet<TopicColor>, StoreError> {
        self.with_connection(used_colors).await
    }

    async fn insert(&self, entry: TopicColorEntry) -> Result<(), StoreError> {
        self.with_connection(move |conn| insert(conn, &entry)).await
    }

    async fn entries(&self) -> Result<Vec<TopicColorEntry>, StoreError> {
        self.with_connection(entries).await
    }
}
