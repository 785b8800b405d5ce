//! Google Custom Search JSON API client, used for scrape-style link resolution.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use jobhound_pipeline::{SourceError, WebSearch};

use crate::{CustomSearchResponse, SearchError};

/// Default Custom Search endpoint.
pub const DEFAULT_CUSTOM_SEARCH_URL: &str = "https://www.googleapis.com";

pub struct CustomSearchClient {
    http: Client,
    base_url: String,
    api_key: String,
    cse_id: String,
}

impl CustomSearchClient {
    pub fn new(api_key: impl Into<String>, cse_id: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_CUSTOM_SEARCH_URL, api_key, cse_id)
    }

    /// Create a client against a custom endpoint.
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        cse_id: impl Into<String>,
    ) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            cse_id: cse_id.into(),
        }
    }

    /// Run a query and return result links in rank order.
    #[tracing::instrument(skip(self))]
    pub async fn links(&self, query: &str) -> Result<Vec<String>, SearchError> {
        let url = format!("{}/customsearch/v1", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", query),
                ("key", self.api_key.as_str()),
                ("cx", self.cse_id.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(SearchError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: CustomSearchResponse = response.json().await?;
        let links: Vec<String> = body
            .items
            .into_iter()
            .filter_map(|item| item.link.filter(|l| !l.is_empty()))
            .collect();

        debug!(count = links.len(), "custom search returned links");
        Ok(links)
    }
}

#[async_trait]
impl WebSearch for CustomSearchClient {
    async fn search(&self, query: &str) -> Result<Vec<String>, SourceError> {
        Ok(self.links(query).await?)
    }
}
