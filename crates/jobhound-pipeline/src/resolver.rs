//! Application link resolution.
//!
//! Two strategies, chosen per call by [`LinkMethod`]:
//! - `Api`: ask the listing-detail provider for the job's apply options and
//!   take the first one, falling back to the provider's own listing URL.
//! - `Scrape`: web-search for the job's description excerpt and take the
//!   first result.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::{LinkMethod, RelatedLink, SourceError};

/// Listing detail as returned by the listing-detail provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingDetail {
    /// Apply option links, in provider order.
    pub apply_links: Vec<String>,
    /// Provider-generated search results page for the listing.
    pub listing_url: String,
}

/// Looks up a single listing by job ID.
#[async_trait]
pub trait ListingDetails: Send + Sync {
    async fn listing(&self, job_id: &str) -> Result<ListingDetail, SourceError>;
}

/// General web search returning result links in rank order.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<String>, SourceError>;
}

/// Resolves the best application link for a job.
#[derive(Clone)]
pub struct LinkResolver {
    listings: Arc<dyn ListingDetails>,
    search: Option<Arc<dyn WebSearch>>,
}

impl LinkResolver {
    /// Create a resolver with only the API strategy available.
    pub fn new(listings: Arc<dyn ListingDetails>) -> Self {
        Self {
            listings,
            search: None,
        }
    }

    /// Enable the scrape strategy.
    pub fn with_web_search(mut self, search: Arc<dyn WebSearch>) -> Self {
        self.search = Some(search);
        self
    }

    /// Resolve a link for `job_id`.
    ///
    /// `query_text` is the description excerpt used by the scrape strategy.
    /// `Ok(None)` means the strategy ran but found nothing.
    #[tracing::instrument(skip(self, query_text))]
    pub async fn resolve(
        &self,
        job_id: &str,
        query_text: &str,
        method: LinkMethod,
    ) -> Result<Option<String>, SourceError> {
        let link = match method {
            LinkMethod::Api => self.resolve_api(job_id).await?,
            LinkMethod::Scrape => self.resolve_scrape(query_text).await?,
        };
        Ok(link.filter(|l| !l.trim().is_empty()))
    }

    async fn resolve_api(&self, job_id: &str) -> Result<Option<String>, SourceError> {
        let detail = self.listings.listing(job_id).await?;
        match detail.apply_links.into_iter().next() {
            Some(link) => Ok(Some(link)),
            None => {
                debug!(job_id, "no apply options, using listing URL");
                Ok(Some(detail.listing_url))
            }
        }
    }

    async fn resolve_scrape(&self, query_text: &str) -> Result<Option<String>, SourceError> {
        let search = self
            .search
            .as_ref()
            .ok_or_else(|| SourceError::Unavailable("web search".to_string()))?;

        let query = format!("intext:\"{}\"", query_text);
        let results = search.search(&query).await?;
        Ok(results.into_iter().next())
    }
}

/// Pick the link to notify with.
///
/// The resolver's link always wins; the first related link is only used
/// when the resolver found nothing.
pub fn choose_link(resolved: Option<String>, related: &[RelatedLink]) -> Option<String> {
    resolved.or_else(|| {
        related
            .first()
            .map(|l| l.url.clone())
            .filter(|url| !url.trim().is_empty())
    })
}
