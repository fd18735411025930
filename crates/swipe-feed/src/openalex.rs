//! OpenAlex works parsing
//!
//! API docs: https://docs.openalex.org/api-entities/works
//! Rate limit: 10 req/sec, polite pool with `mailto`

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::FeedError;
use crate::paper::{normalize_doi, WorkSummary, DEFAULT_TOPIC, MISSING_ABSTRACT, UNDATED};

pub const OPENALEX_WORKS_URL: &str = "https://api.openalex.org/works";

/// Works fetched per feed page.
pub const WORKS_PER_PAGE: u32 = 6;

#[derive(Debug, Deserialize)]
struct WorksResponse {
    #[serde(default)]
    results: Vec<OpenAlexWork>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexWork {
    title: Option<String>,
    display_name: Option<String>,
    publication_year: Option<i32>,
    #[serde(default)]
    authorships: Vec<OpenAlexAuthorship>,
    primary_topic: Option<OpenAlexTopic>,
    doi: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    abstract_inverted_index: Option<HashMap<String, Vec<usize>>>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexAuthorship {
    author: OpenAlexAuthor,
}

#[derive(Debug, Deserialize)]
struct OpenAlexAuthor {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexTopic {
    display_name: Option<String>,
}

/// A parsed page of works.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksPage {
    pub works: Vec<WorkSummary>,
    /// Number of results in the response, including works that were
    /// dropped for lacking a title.
    pub result_count: usize,
}

impl WorksPage {
    /// Whether the source may have further pages.
    pub fn has_more(&self) -> bool {
        self.result_count > 0
    }
}

/// Query for one page of the newest non-paratext works.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksQuery {
    pub page: u32,
    pub per_page: u32,
    /// Contact address for OpenAlex's polite pool.
    pub mailto: Option<String>,
}

impl WorksQuery {
    pub fn page(page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: WORKS_PER_PAGE,
            mailto: None,
        }
    }

    pub fn with_mailto(mut self, mailto: impl Into<String>) -> Self {
        self.mailto = Some(mailto.into());
        self
    }

    pub fn url(&self) -> String {
        let mut url = format!(
            "{}?filter=is_paratext:false&sort=publication_date:desc&per_page={}&page={}",
            OPENALEX_WORKS_URL, self.per_page, self.page
        );
        if let Some(mailto) = &self.mailto {
            url.push_str("&mailto=");
            url.push_str(&urlencoding::encode(mailto));
        }
        url
    }
}

/// Parse an OpenAlex `/works` list response.
pub fn parse_works_page(json: &str) -> Result<WorksPage, FeedError> {
    let response: WorksResponse = serde_json::from_str(json)
        .map_err(|e| FeedError::Parse(format!("Invalid OpenAlex JSON: {}", e)))?;

    let result_count = response.results.len();
    let works = response.results.into_iter().filter_map(parse_work).collect();
    Ok(WorksPage {
        works,
        result_count,
    })
}

fn parse_work(work: OpenAlexWork) -> Option<WorkSummary> {
    let title = work
        .title
        .or(work.display_name)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())?;

    let authors = work
        .authorships
        .into_iter()
        .filter_map(|a| a.author.display_name)
        .collect::<Vec<_>>()
        .join(", ");

    let abstract_text = work
        .abstract_text
        .filter(|a| !a.trim().is_empty())
        .or_else(|| work.abstract_inverted_index.as_ref().map(rebuild_abstract))
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| MISSING_ABSTRACT.to_string());

    let topic = work
        .primary_topic
        .and_then(|t| t.display_name)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TOPIC.to_string());

    Some(WorkSummary {
        title,
        authors,
        abstract_text,
        date: work
            .publication_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| UNDATED.to_string()),
        topic,
        doi: work.doi.map(|d| normalize_doi(&d).to_string()),
    })
}

/// Rebuild abstract text from OpenAlex's word -> positions index.
pub fn rebuild_abstract(index: &HashMap<String, Vec<usize>>) -> String {
    let mut positioned: Vec<(usize, &str)> = index
        .iter()
        .flat_map(|(word, positions)| positions.iter().map(move |p| (*p, word.as_str())))
        .collect();
    positioned.sort_by_key(|(p, _)| *p);
    positioned
        .into_iter()
        .map(|(_, w)| w)
        .collect::<Vec<_>>()
        .join(" ")
}
