//! Job source capability.

use async_trait::async_trait;

use crate::{JobRecord, SourceError};

/// A job search provider queried once per cycle.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Fetch listings posted today that match `query` near `location`.
    ///
    /// Results come back in provider order with no further ranking.
    async fn fetch_latest(&self, location: &str, query: &str)
    -> Result<Vec<JobRecord>, SourceError>;
}
