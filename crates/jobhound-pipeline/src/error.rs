//! Error types for the pipeline.

use thiserror::Error;

/// Errors that end a cycle before any job is processed.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The job source could not be queried.
    #[error("fetch failed: {0}")]
    Fetch(#[from] SourceError),

    /// The dedup state could not be written.
    #[error("persist failed: {0}")]
    Persist(#[from] StoreError),
}

/// Errors from a provider capability (search, listing detail, web search).
#[derive(Debug, Error)]
pub enum SourceError {
    /// The provider returned an error.
    #[error("provider error: {0}")]
    Provider(String),

    /// The provider did not answer in time.
    #[error("provider timed out")]
    Timeout,

    /// The provider rejected the request because of quota or rate limits.
    #[error("rate limited{}", retry_after_secs.map(|s| format!(" (retry after {}s)", s)).unwrap_or_default())]
    RateLimited {
        /// Seconds to wait before retrying (from Retry-After header, optional).
        retry_after_secs: Option<u64>,
    },

    /// The response could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The capability is not configured in this process.
    #[error("not configured: {0}")]
    Unavailable(String),
}

/// Errors from the dedup store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from a notification sink.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The target channel does not exist.
    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    /// The target channel exists but cannot receive job posts.
    #[error("channel {0} is not a forum channel")]
    WrongChannelKind(String),

    /// The sink rejected the notification.
    #[error("sink error: {0}")]
    Sink(String),
}

/// Errors from runtime settings updates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// Link method other than `api` or `scraping`.
    #[error("unknown link method: {0}")]
    UnknownLinkMethod(String),
}
