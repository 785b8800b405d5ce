//! Error types for the Discord client.

use jobhound_pipeline::NotifyError;
use thiserror::Error;

/// Errors that can occur when posting to Discord.
#[derive(Debug, Error)]
pub enum DiscordError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Discord rejected the request.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Rate limited.
    #[error("rate limited{}", retry_after_secs.map(|s| format!(" (retry after {}s)", s)).unwrap_or_default())]
    RateLimited {
        /// Seconds to wait before retrying (from Retry-After header, optional).
        retry_after_secs: Option<u64>,
    },

    /// The configured channel does not exist or is not visible to the bot.
    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    /// The configured channel is not a forum channel.
    #[error("channel {0} is not a forum channel")]
    NotForumChannel(String),
}

impl From<DiscordError> for NotifyError {
    fn from(err: DiscordError) -> Self {
        match err {
            DiscordError::ChannelNotFound(id) => NotifyError::ChannelNotFound(id),
            DiscordError::NotForumChannel(id) => NotifyError::WrongChannelKind(id),
            other => NotifyError::Sink(other.to_string()),
        }
    }
}
