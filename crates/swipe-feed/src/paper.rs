//! Paper card types.

use serde::{Deserialize, Serialize};
use swipe_topics::TopicColor;

/// Topic shown when a work has no primary topic.
pub const DEFAULT_TOPIC: &str = "Research";

/// Abstract shown when a work has none.
pub const MISSING_ABSTRACT: &str = "Abstract not available";

/// Date shown when a work has no publication year.
pub const UNDATED: &str = "n.d.";

/// A work as parsed from a source, before card decoration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSummary {
    pub title: String,
    /// Display names joined with ", ".
    pub authors: String,
    pub abstract_text: String,
    pub date: String,
    pub topic: String,
    /// Bare DOI (`10.xxxx/...`), without resolver prefix.
    pub doi: Option<String>,
}

/// A fully decorated feed card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPaper {
    pub title: String,
    pub authors: String,
    pub abstract_text: String,
    pub date: String,
    pub topic: String,
    pub topic_color: TopicColor,
    /// CSS background for the card.
    pub background: String,
    pub doi: Option<String>,
}

impl FeedPaper {
    /// Decorate a work with its topic color; the background is filled in
    /// once the whole page is known.
    pub fn new(work: WorkSummary, topic_color: TopicColor) -> Self {
        Self {
            title: work.title,
            authors: work.authors,
            abstract_text: work.abstract_text,
            date: work.date,
            topic: work.topic,
            topic_color,
            background: String::new(),
            doi: work.doi,
        }
    }

    /// Link for the share button.
    pub fn share_url(&self) -> Option<String> {
        self.doi.as_deref().map(doi_url)
    }
}

/// One page of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPage {
    pub papers: Vec<FeedPaper>,
    pub next_page: u32,
    /// False once the source returned an empty page.
    pub has_more: bool,
}

/// Resolver URL for a DOI.
pub fn doi_url(doi: &str) -> String {
    format!("https://doi.org/{}", normalize_doi(doi))
}

/// Strip resolver prefixes from a DOI.
///
/// # Examples
/// ```
/// use swipe_feed::normalize_doi;
/// assert_eq!(normalize_doi("https://doi.org/10.1038/nature12373"), "10.1038/nature12373");
/// assert_eq!(normalize_doi("doi:10.1038/nature12373"), "10.1038/nature12373");
/// ```
pub fn normalize_doi(doi: &str) -> &str {
    let doi = doi.trim();
    ["https://doi.org/", "http://doi.org/", "https://dx.doi.org/", "http://dx.doi.org/", "doi:"]
        .iter()
        .find_map(|prefix| doi.strip_prefix(prefix))
        .unwrap_or(doi)
}

/// Compact label for grid views: the topic's first word.
pub fn short_topic_label(topic: &str) -> &str {
    topic.split_whitespace().next().unwrap_or("")
}
