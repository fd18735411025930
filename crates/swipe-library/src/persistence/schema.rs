//! SQLite schema for the reader library

/// Schema version for migrations
pub const SCHEMA_VERSION: u32 = 2;

/// SQLite schema definition
pub struct Schema;

impl Schema {
    /// Get the complete schema SQL
    pub fn create_tables() -> &'static str {
        r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Liked papers, one row per (user, title)
CREATE TABLE IF NOT EXISTS liked_papers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    paper_title TEXT NOT NULL,
    authors TEXT NOT NULL,
    date TEXT NOT NULL,
    background TEXT NOT NULL,
    topic TEXT,
    topic_color TEXT,
    doi TEXT,
    created_at TEXT NOT NULL,
    UNIQUE (user_id, paper_title)
);

CREATE INDEX IF NOT EXISTS idx_liked_papers_user ON liked_papers(user_id, created_at);

-- Profiles; list columns hold JSON arrays
CREATE TABLE IF NOT EXISTS profile_details (
    user_id TEXT PRIMARY KEY,
    research_fields TEXT NOT NULL,
    interests TEXT NOT NULL,
    skills TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Flat interest list read by the ranked feed
CREATE TABLE IF NOT EXISTS user_interests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    interest TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_user_interests_user ON user_interests(user_id);

-- Ranked feed candidates; vector columns hold JSON arrays of floats
CREATE TABLE IF NOT EXISTS papers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL UNIQUE,
    topics TEXT,
    abstract TEXT,
    doi TEXT,
    pub_date TEXT,
    authorships TEXT,
    abstract_vector TEXT NOT NULL,
    title_vector TEXT NOT NULL,
    keywords_vector TEXT NOT NULL
);
"#
    }

    /// Get migration SQL for a specific version
    pub fn migration(from_version: u32, to_version: u32) -> Option<&'static str> {
        match (from_version, to_version) {
            (1, 2) => Some(
                r#"
CREATE TABLE IF NOT EXISTS papers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL UNIQUE,
    topics TEXT,
    abstract TEXT,
    doi TEXT,
    pub_date TEXT,
    authorships TEXT,
    abstract_vector TEXT NOT NULL,
    title_vector TEXT NOT NULL,
    keywords_vector TEXT NOT NULL
);
"#,
            ),
            _ => None,
        }
    }
}
