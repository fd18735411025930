//! OpenAlex HTTP client using reqwest

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::error::FeedError;
use crate::openalex::{parse_works_page, WorksPage, WorksQuery};

pub struct OpenAlexClient {
    client: Client,
    user_agent: String,
    mailto: Option<String>,
}

impl OpenAlexClient {
    pub fn new(user_agent: &str) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FeedError::Http(e.to_string()))?;

        Ok(Self {
            client,
            user_agent: user_agent.to_string(),
            mailto: None,
        })
    }

    /// Join OpenAlex's polite pool.
    pub fn with_mailto(mut self, mailto: impl Into<String>) -> Self {
        self.mailto = Some(mailto.into());
        self
    }

    /// Fetch one page of works, newest first.
    pub async fn fetch_page(&self, page: u32) -> Result<WorksPage, FeedError> {
        let mut query = WorksQuery::page(page);
        if let Some(mailto) = &self.mailto {
            query = query.with_mailto(mailto.clone());
        }
        let url = query.url();
        debug!(%url, "Fetching OpenAlex works");

        let response = self
            .client
            .get(&url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| FeedError::Http(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            warn!("OpenAlex rate limit hit");
            return Err(FeedError::RateLimited);
        }
        if !status.is_success() {
            return Err(FeedError::Http(format!("OpenAlex returned {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FeedError::Http(e.to_string()))?;
        parse_works_page(&body)
    }
}
