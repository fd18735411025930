//! Repository for liked papers, profiles and interests

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::schema::{Schema, SCHEMA_VERSION};
use crate::error::{LibraryError, Result};
use crate::model::{
    clean_fields, clean_strings, IndexedPaper, LikedPaper, NewLikedPaper, NewPaper, Paper,
    ProfileDetails, ResearchInterest,
};

const LIKED_COLUMNS: &str =
    "id, user_id, paper_title, authors, date, background, topic, topic_color, doi, created_at";

const PAPER_COLUMNS: &str = "id, title, topics, abstract, doi, pub_date, authorships";

/// Repository for persisting reader state
pub struct Repository {
    conn: rusqlite::Connection,
}

impl Repository {
    /// Create a new repository with the given database path
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = rusqlite::Connection::open(path)?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Create an in-memory repository (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Initialize the database schema
    fn initialize(&self) -> Result<()> {
        self.conn
            .busy_timeout(std::time::Duration::from_secs(5))?;

        let current_version = self.schema_version().unwrap_or(0);

        if current_version == 0 {
            self.conn.execute_batch(Schema::create_tables())?;
            self.set_schema_version(SCHEMA_VERSION)?;
        } else if current_version < SCHEMA_VERSION {
            for version in current_version..SCHEMA_VERSION {
                if let Some(migration) = Schema::migration(version, version + 1) {
                    self.conn.execute_batch(migration)?;
                }
            }
            self.set_schema_version(SCHEMA_VERSION)?;
        }

        Ok(())
    }

    /// Applied schema version, if the database has been initialized
    pub fn schema_version(&self) -> Option<u32> {
        self.conn
            .query_row(
                "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .ok()
    }

    fn set_schema_version(&self, version: u32) -> Result<()> {
        self.conn
            .execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
        Ok(())
    }

    // ==================== Liked Papers ====================

    /// Like a paper. Liking the same title again keeps the first row.
    pub fn like(&self, user_id: &str, paper: NewLikedPaper) -> Result<LikedPaper> {
        let user_id = require(user_id, "user_id")?;
        let title = require(&paper.paper_title, "paper_title")?;

        let inserted = self.conn.execute(
            r#"
            INSERT INTO liked_papers
            (user_id, paper_title, authors, date, background, topic, topic_color, doi, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT (user_id, paper_title) DO NOTHING
            "#,
            rusqlite::params![
                user_id,
                title,
                paper.authors,
                paper.date,
                paper.background,
                paper.topic,
                paper.topic_color,
                paper.doi,
                Utc::now().to_rfc3339(),
            ],
        )?;
        if inserted == 0 {
            debug!(user_id, title, "Paper already liked");
        }

        self.liked_paper(user_id, title)?
            .ok_or_else(|| LibraryError::NotFound(format!("liked paper '{}'", title)))
    }

    /// Remove a like. Returns whether a row was removed.
    pub fn unlike(&self, user_id: &str, paper_title: &str) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM liked_papers WHERE user_id = ?1 AND paper_title = ?2",
            [user_id.trim(), paper_title.trim()],
        )?;
        Ok(removed > 0)
    }

    pub fn is_liked(&self, user_id: &str, paper_title: &str) -> Result<bool> {
        Ok(self.liked_paper(user_id, paper_title)?.is_some())
    }

    /// Flip the like state of a paper. Returns the new state.
    pub fn toggle_like(&self, user_id: &str, paper: NewLikedPaper) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let liked = if self.is_liked(user_id, &paper.paper_title)? {
            self.unlike(user_id, &paper.paper_title)?;
            false
        } else {
            self.like(user_id, paper)?;
            true
        };
        tx.commit()?;
        Ok(liked)
    }

    pub fn liked_paper(&self, user_id: &str, paper_title: &str) -> Result<Option<LikedPaper>> {
        let result = self.conn.query_row(
            &format!(
                "SELECT {} FROM liked_papers WHERE user_id = ?1 AND paper_title = ?2",
                LIKED_COLUMNS
            ),
            [user_id.trim(), paper_title.trim()],
            Self::row_to_liked_paper,
        );

        match result {
            Ok(paper) => Ok(Some(paper)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// A user's liked papers, oldest first
    pub fn liked_papers(&self, user_id: &str) -> Result<Vec<LikedPaper>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM liked_papers WHERE user_id = ?1 ORDER BY id",
            LIKED_COLUMNS
        ))?;

        let papers = stmt
            .query_map([user_id.trim()], Self::row_to_liked_paper)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(papers)
    }

    fn row_to_liked_paper(row: &rusqlite::Row) -> rusqlite::Result<LikedPaper> {
        let created_at: String = row.get(9)?;
        Ok(LikedPaper {
            id: row.get(0)?,
            user_id: row.get(1)?,
            paper_title: row.get(2)?,
            authors: row.get(3)?,
            date: row.get(4)?,
            background: row.get(5)?,
            topic: row.get(6)?,
            topic_color: row.get(7)?,
            doi: row.get(8)?,
            created_at: parse_timestamp(&created_at),
        })
    }

    // ==================== Profiles ====================

    /// Create or update a profile. Blank topics and skills are dropped; the
    /// creation time of an existing profile is kept.
    pub fn save_profile(
        &self,
        user_id: &str,
        research_fields: Vec<ResearchInterest>,
        skills: Vec<String>,
    ) -> Result<ProfileDetails> {
        let user_id = require(user_id, "user_id")?;
        let research_fields = clean_fields(research_fields);
        let skills = clean_strings(skills);
        let interests: Vec<&str> = research_fields.iter().map(|f| f.topic.as_str()).collect();

        self.conn.execute(
            r#"
            INSERT INTO profile_details (user_id, research_fields, interests, skills, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (user_id) DO UPDATE SET
                research_fields = excluded.research_fields,
                interests = excluded.interests,
                skills = excluded.skills
            "#,
            rusqlite::params![
                user_id,
                serde_json::to_string(&research_fields)?,
                serde_json::to_string(&interests)?,
                serde_json::to_string(&skills)?,
                Utc::now().to_rfc3339(),
            ],
        )?;
        debug!(user_id, fields = research_fields.len(), "Saved profile");

        self.profile(user_id)?
            .ok_or_else(|| LibraryError::NotFound(format!("profile '{}'", user_id)))
    }

    pub fn profile(&self, user_id: &str) -> Result<Option<ProfileDetails>> {
        let result = self.conn.query_row(
            "SELECT user_id, research_fields, skills, created_at FROM profile_details WHERE user_id = ?1",
            [user_id.trim()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        );

        let (user_id, fields_json, skills_json, created_at) = match result {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(ProfileDetails {
            user_id,
            research_fields: serde_json::from_str(&fields_json)?,
            skills: serde_json::from_str(&skills_json)?,
            created_at: parse_timestamp(&created_at),
        }))
    }

    // ==================== Interests ====================

    /// Replace a user's interest list. Blank entries are dropped.
    pub fn replace_interests(&self, user_id: &str, interests: Vec<String>) -> Result<usize> {
        let user_id = require(user_id, "user_id")?;
        let interests = clean_strings(interests);

        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM user_interests WHERE user_id = ?1", [user_id])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO user_interests (user_id, interest) VALUES (?1, ?2)")?;
            for interest in &interests {
                stmt.execute([user_id, interest.as_str()])?;
            }
        }
        tx.commit()?;

        debug!(user_id, count = interests.len(), "Replaced interests");
        Ok(interests.len())
    }

    /// A user's interests, in the order they were given
    pub fn interests(&self, user_id: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT interest FROM user_interests WHERE user_id = ?1 ORDER BY id")?;
        let interests = stmt
            .query_map([user_id.trim()], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(interests)
    }

    // ==================== Papers ====================

    /// Add a feed candidate. Adding a title again replaces its metadata and
    /// embeddings.
    pub fn add_paper(&self, paper: NewPaper) -> Result<Paper> {
        let title = require(&paper.title, "title")?.to_string();
        let dimension = paper.dimension()?;

        self.conn.execute(
            r#"
            INSERT INTO papers
            (title, topics, abstract, doi, pub_date, authorships,
             abstract_vector, title_vector, keywords_vector)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT (title) DO UPDATE SET
                topics = excluded.topics,
                abstract = excluded.abstract,
                doi = excluded.doi,
                pub_date = excluded.pub_date,
                authorships = excluded.authorships,
                abstract_vector = excluded.abstract_vector,
                title_vector = excluded.title_vector,
                keywords_vector = excluded.keywords_vector
            "#,
            rusqlite::params![
                title,
                paper.topics,
                paper.abstract_text,
                paper.doi,
                paper.pub_date,
                paper.authorships,
                serde_json::to_string(&paper.abstract_vector)?,
                serde_json::to_string(&paper.title_vector)?,
                serde_json::to_string(&paper.keywords_vector)?,
            ],
        )?;
        debug!(title = %title, dimension, "Stored paper");

        self.paper(&title)?
            .ok_or_else(|| LibraryError::NotFound(format!("paper '{}'", title)))
    }

    pub fn paper(&self, title: &str) -> Result<Option<Paper>> {
        let result = self.conn.query_row(
            &format!("SELECT {} FROM papers WHERE title = ?1", PAPER_COLUMNS),
            [title.trim()],
            Self::row_to_paper,
        );

        match result {
            Ok(paper) => Ok(Some(paper)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Every candidate with its embeddings, in insertion order
    pub fn paper_candidates(&self) -> Result<Vec<IndexedPaper>> {
        let sql = format!(
            "SELECT {}, abstract_vector, title_vector, keywords_vector FROM papers ORDER BY id",
            PAPER_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    Self::row_to_paper(row)?,
                    row.get::<_, String>(7)?,
                    row.get::<_, String>(8)?,
                    row.get::<_, String>(9)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(paper, abstract_vector, title_vector, keywords_vector)| {
                Ok(IndexedPaper {
                    paper,
                    abstract_vector: serde_json::from_str(&abstract_vector)?,
                    title_vector: serde_json::from_str(&title_vector)?,
                    keywords_vector: serde_json::from_str(&keywords_vector)?,
                })
            })
            .collect()
    }

    fn row_to_paper(row: &rusqlite::Row) -> rusqlite::Result<Paper> {
        Ok(Paper {
            id: row.get(0)?,
            title: row.get(1)?,
            topics: row.get(2)?,
            abstract_text: row.get(3)?,
            doi: row.get(4)?,
            pub_date: row.get(5)?,
            authorships: row.get(6)?,
        })
    }
}

fn require<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LibraryError::Validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed)
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResearchLevel;

    #[test]
    fn test_repository_creation() {
        let repo = Repository::in_memory().unwrap();
        assert_eq!(repo.schema_version(), Some(SCHEMA_VERSION));
        assert!(repo.liked_papers("u1").unwrap().is_empty());
        assert!(repo.profile("u1").unwrap().is_none());
    }

    #[test]
    fn test_like_is_idempotent() {
        let repo = Repository::in_memory().unwrap();

        let mut paper = NewLikedPaper::new("Cosmic Shear");
        paper.topic = Some("Cosmology".into());
        let first = repo.like("u1", paper.clone()).unwrap();

        paper.topic = Some("Something else".into());
        let second = repo.like("u1", paper).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.topic.as_deref(), Some("Cosmology"));
        assert_eq!(repo.liked_papers("u1").unwrap().len(), 1);
    }

    #[test]
    fn test_likes_are_per_user() {
        let repo = Repository::in_memory().unwrap();
        repo.like("u1", NewLikedPaper::new("Shared Title")).unwrap();
        repo.like("u2", NewLikedPaper::new("Shared Title")).unwrap();

        assert!(repo.unlike("u1", "Shared Title").unwrap());
        assert!(!repo.is_liked("u1", "Shared Title").unwrap());
        assert!(repo.is_liked("u2", "Shared Title").unwrap());
    }

    #[test]
    fn test_toggle_like() {
        let repo = Repository::in_memory().unwrap();
        let paper = NewLikedPaper::new("Toggled");

        assert!(repo.toggle_like("u1", paper.clone()).unwrap());
        assert!(repo.is_liked("u1", "Toggled").unwrap());
        assert!(!repo.toggle_like("u1", paper).unwrap());
        assert!(!repo.is_liked("u1", "Toggled").unwrap());
    }

    #[test]
    fn test_unlike_missing_returns_false() {
        let repo = Repository::in_memory().unwrap();
        assert!(!repo.unlike("u1", "Never liked").unwrap());
    }

    #[test]
    fn test_blank_title_rejected() {
        let repo = Repository::in_memory().unwrap();
        let err = repo.like("u1", NewLikedPaper::new("  ")).unwrap_err();
        assert!(matches!(err, LibraryError::Validation(_)));
    }

    #[test]
    fn test_save_profile_upserts() {
        let repo = Repository::in_memory().unwrap();

        let created = repo
            .save_profile(
                "u1",
                vec![
                    ResearchInterest::new("Genomics", ResearchLevel::Expert),
                    ResearchInterest::new("", ResearchLevel::Learning),
                ],
                vec!["Python".into(), " ".into()],
            )
            .unwrap();
        assert_eq!(created.interests(), vec!["Genomics".to_string()]);
        assert_eq!(created.skills, vec!["Python".to_string()]);

        let updated = repo
            .save_profile(
                "u1",
                vec![ResearchInterest::new("Optics", ResearchLevel::General)],
                vec![],
            )
            .unwrap();
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.research_fields[0].level, ResearchLevel::General);
        assert!(updated.skills.is_empty());
    }

    #[test]
    fn test_add_paper_replaces_by_title() {
        let repo = Repository::in_memory().unwrap();

        let mut paper = NewPaper::new("Cosmic Shear", vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]);
        paper.topics = Some("Cosmology".into());
        let first = repo.add_paper(paper.clone()).unwrap();

        paper.abstract_vector = vec![0.0, 1.0];
        paper.doi = Some("10.1/abc".into());
        let second = repo.add_paper(paper).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.doi.as_deref(), Some("10.1/abc"));

        let candidates = repo.paper_candidates().unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].paper.topics.as_deref(), Some("Cosmology"));
        assert_eq!(candidates[0].abstract_vector, vec![0.0, 1.0]);
        assert_eq!(candidates[0].keywords_vector, vec![0.5, 0.5]);
    }

    #[test]
    fn test_add_paper_validates() {
        let repo = Repository::in_memory().unwrap();

        let untitled = NewPaper::new(" ", vec![1.0], vec![1.0], vec![1.0]);
        assert!(matches!(repo.add_paper(untitled), Err(LibraryError::Validation(_))));

        let ragged = NewPaper::new("Ragged", vec![1.0, 0.0], vec![1.0], vec![1.0, 0.0]);
        assert!(matches!(repo.add_paper(ragged), Err(LibraryError::Validation(_))));

        assert!(repo.paper_candidates().unwrap().is_empty());
    }

    #[test]
    fn test_replace_interests() {
        let repo = Repository::in_memory().unwrap();

        repo.replace_interests("u1", vec!["a".into(), "b".into()])
            .unwrap();
        let n = repo
            .replace_interests("u1", vec!["c".into(), "".into()])
            .unwrap();

        assert_eq!(n, 1);
        assert_eq!(repo.interests("u1").unwrap(), vec!["c".to_string()]);
        assert!(repo.interests("u2").unwrap().is_empty());
    }
}
