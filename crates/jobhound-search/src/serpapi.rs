//! SerpApi client for Google Jobs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use jobhound_pipeline::{JobRecord, JobSource, ListingDetail, ListingDetails, SourceError};

use crate::{JobsSearchResponse, ListingResponse, SearchError};

/// Default SerpApi endpoint.
pub const DEFAULT_SERPAPI_URL: &str = "https://serpapi.com";

/// Only listings posted today are requested.
const POSTED_TODAY_CHIP: &str = "date_posted:today";

/// SerpApi reports an empty result page as an error with this prefix.
const NO_RESULTS_PREFIX: &str = "Google hasn't returned any results";

/// Error envelope SerpApi returns on failures.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
}

/// Client for the SerpApi search endpoint.
pub struct SerpApiClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl SerpApiClient {
    /// Create a client against the public SerpApi endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_SERPAPI_URL, api_key)
    }

    /// Create a client against a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Search Google Jobs for listings posted today.
    #[tracing::instrument(skip(self))]
    pub async fn search_jobs(
        &self,
        query: &str,
        location: &str,
    ) -> Result<Vec<JobRecord>, SearchError> {
        let response: Option<JobsSearchResponse> = self
            .search(&[
                ("engine", "google_jobs"),
                ("q", query),
                ("location", location),
                ("chips", POSTED_TODAY_CHIP),
            ])
            .await?;

        let results = response.map(|r| r.jobs_results).unwrap_or_default();
        let total = results.len();
        let jobs: Vec<JobRecord> = results
            .into_iter()
            .filter_map(|r| r.into_fields())
            .map(JobRecord::from)
            .collect();

        if jobs.len() < total {
            warn!(dropped = total - jobs.len(), "dropped job results without an ID");
        }
        debug!(count = jobs.len(), "fetched google jobs results");
        Ok(jobs)
    }

    /// Look up a single Google Jobs listing.
    #[tracing::instrument(skip(self))]
    pub async fn listing(&self, job_id: &str) -> Result<ListingDetail, SearchError> {
        let response: Option<ListingResponse> = self
            .search(&[("engine", "google_jobs_listing"), ("q", job_id)])
            .await?;

        Ok(response.map(ListingDetail::from).unwrap_or_default())
    }

    /// Run a search and decode the body.
    ///
    /// Returns `None` when SerpApi reports that the query had no results.
    async fn search<T: DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<Option<T>, SearchError> {
        let url = format!("{}/search.json", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(params)
            .query(&[("api_key", self.api_key.as_str())])
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

        let body = response.text().await?;
        let envelope: Option<ErrorEnvelope> = serde_json::from_str(&body).ok();
        if let Some(message) = envelope.and_then(|e| e.error) {
            if message.starts_with(NO_RESULTS_PREFIX) {
                debug!("provider returned no results");
                return Ok(None);
            }
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if !status.is_success() {
            return Err(SearchError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(Some(serde_json::from_str(&body)?))
    }
}

#[async_trait]
impl JobSource for SerpApiClient {
    async fn fetch_latest(
        &self,
        location: &str,
        query: &str,
    ) -> Result<Vec<JobRecord>, SourceError> {
        Ok(self.search_jobs(query, location).await?)
    }
}

#[async_trait]
impl ListingDetails for SerpApiClient {
    async fn listing(&self, job_id: &str) -> Result<ListingDetail, SourceError> {
        Ok(SerpApiClient::listing(self, job_id).await?)
    }
}
