//! Error types for the search adapters.

use jobhound_pipeline::SourceError;
use thiserror::Error;

/// Errors that can occur when calling a search provider.
#[derive(Debug, Error)]
pub enum SearchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider answered with an error message.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Rate limited or out of quota.
    #[error("rate limited{}", retry_after_secs.map(|s| format!(" (retry after {}s)", s)).unwrap_or_default())]
    RateLimited {
        /// Seconds to wait before retrying (from Retry-After header, optional).
        retry_after_secs: Option<u64>,
    },

    /// Response was well-formed JSON but not what we expected.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<SearchError> for SourceError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Http(e) if e.is_timeout() => SourceError::Timeout,
            SearchError::Http(e) => SourceError::Provider(e.to_string()),
            SearchError::Json(e) => SourceError::InvalidResponse(e.to_string()),
            SearchError::Api { status, message } => {
                SourceError::Provider(format!("{} ({})", message, status))
            }
            SearchError::RateLimited { retry_after_secs } => {
                SourceError::RateLimited { retry_after_secs }
            }
            SearchError::InvalidResponse(msg) => SourceError::InvalidResponse(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_message() {
        let err = SearchError::RateLimited {
            retry_after_secs: Some(30),
        };
        assert_eq!(err.to_string(), "rate limited (retry after 30s)");

        let err = SearchError::RateLimited {
            retry_after_secs: None,
        };
        assert_eq!(err.to_string(), "rate limited");
    }

    #[test]
    fn test_into_source_error() {
        let err: SourceError = SearchError::Api {
            status: 401,
            message: "Invalid API key".to_string(),
        }
        .into();
        assert!(matches!(err, SourceError::Provider(msg) if msg.contains("Invalid API key")));

        let err: SourceError = SearchError::RateLimited {
            retry_after_secs: None,
        }
        .into();
        assert!(matches!(err, SourceError::RateLimited { .. }));
    }
}
