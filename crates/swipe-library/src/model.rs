//! Library records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LibraryError;

/// A paper a user liked, as it appeared on its card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikedPaper {
    pub id: i64,
    pub user_id: String,
    pub paper_title: String,
    pub authors: String,
    pub date: String,
    pub background: String,
    pub topic: Option<String>,
    pub topic_color: Option<String>,
    pub doi: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Card fields recorded when liking a paper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLikedPaper {
    pub paper_title: String,
    #[serde(default)]
    pub authors: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub topic_color: Option<String>,
    #[serde(default)]
    pub doi: Option<String>,
}

impl NewLikedPaper {
    pub fn new(paper_title: impl Into<String>) -> Self {
        Self {
            paper_title: paper_title.into(),
            ..Default::default()
        }
    }
}

/// A paper in the ranked feed's candidate pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub id: i64,
    pub title: String,
    pub topics: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub doi: Option<String>,
    pub pub_date: Option<String>,
    pub authorships: Option<String>,
}

/// A candidate paper with its precomputed embeddings.
///
/// All three vectors must share one dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPaper {
    pub title: String,
    #[serde(default)]
    pub topics: Option<String>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub pub_date: Option<String>,
    #[serde(default)]
    pub authorships: Option<String>,
    pub abstract_vector: Vec<f32>,
    pub title_vector: Vec<f32>,
    pub keywords_vector: Vec<f32>,
}

impl NewPaper {
    pub fn new(
        title: impl Into<String>,
        abstract_vector: Vec<f32>,
        title_vector: Vec<f32>,
        keywords_vector: Vec<f32>,
    ) -> Self {
        Self {
            title: title.into(),
            abstract_vector,
            title_vector,
            keywords_vector,
            ..Default::default()
        }
    }

    /// Shared embedding dimension.
    pub(crate) fn dimension(&self) -> Result<usize, LibraryError> {
        let dim = self.abstract_vector.len();
        if dim == 0 {
            return Err(LibraryError::Validation(
                "embeddings must not be empty".to_string(),
            ));
        }
        if self.title_vector.len() != dim || self.keywords_vector.len() != dim {
            return Err(LibraryError::Validation(format!(
                "embedding dimensions differ: abstract {}, title {}, keywords {}",
                dim,
                self.title_vector.len(),
                self.keywords_vector.len()
            )));
        }
        Ok(dim)
    }
}

/// A stored paper together with its embeddings.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedPaper {
    pub paper: Paper,
    pub abstract_vector: Vec<f32>,
    pub title_vector: Vec<f32>,
    pub keywords_vector: Vec<f32>,
}

/// How well the reader knows a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchLevel {
    #[default]
    Learning,
    General,
    Expert,
}

impl ResearchLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchLevel::Learning => "learning",
            ResearchLevel::General => "general",
            ResearchLevel::Expert => "expert",
        }
    }
}

impl fmt::Display for ResearchLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResearchLevel {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "learning" => Ok(ResearchLevel::Learning),
            "general" => Ok(ResearchLevel::General),
            "expert" => Ok(ResearchLevel::Expert),
            other => Err(LibraryError::Validation(format!(
                "unknown research level: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchInterest {
    pub topic: String,
    #[serde(default)]
    pub level: ResearchLevel,
}

impl ResearchInterest {
    pub fn new(topic: impl Into<String>, level: ResearchLevel) -> Self {
        Self {
            topic: topic.into(),
            level,
        }
    }
}

/// A reader's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDetails {
    pub user_id: String,
    pub research_fields: Vec<ResearchInterest>,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ProfileDetails {
    /// Field topics, in profile order.
    pub fn interests(&self) -> Vec<String> {
        self.research_fields.iter().map(|f| f.topic.clone()).collect()
    }
}

/// Drop blank topics and trim the rest.
pub(crate) fn clean_fields(fields: Vec<ResearchInterest>) -> Vec<ResearchInterest> {
    fields
        .into_iter()
        .filter_map(|f| {
            let topic = f.topic.trim();
            (!topic.is_empty()).then(|| ResearchInterest::new(topic, f.level))
        })
        .collect()
}

/// Drop blank entries and trim the rest.
pub(crate) fn clean_strings(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
