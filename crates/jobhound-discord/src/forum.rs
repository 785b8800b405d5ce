//! Forum channel poster.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use jobhound_pipeline::{Notification, NotificationSink, NotifyError};

use crate::{ApiErrorBody, Channel, CreateForumThread, DiscordError, Thread};

/// Default Discord REST endpoint.
pub const DEFAULT_DISCORD_API_URL: &str = "https://discord.com/api/v10";

/// Posts notifications as threads in a single forum channel.
pub struct ForumClient {
    http: Client,
    base_url: String,
    token: String,
    channel_id: String,
    /// Set once the channel has been confirmed to be a forum.
    verified: AtomicBool,
}

impl ForumClient {
    pub fn new(token: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_DISCORD_API_URL, token, channel_id)
    }

    /// Create a client against a custom endpoint.
    pub fn with_base_url(
        base_url: impl Into<String>,
        token: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            channel_id: channel_id.into(),
            verified: AtomicBool::new(false),
        }
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.token)
    }

    /// Fetch the configured channel and check that it is a forum.
    #[tracing::instrument(skip(self), fields(channel_id = %self.channel_id))]
    pub async fn verify_channel(&self) -> Result<Channel, DiscordError> {
        let url = format!("{}/channels/{}", self.base_url, self.channel_id);

        let response = self
            .http
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(DiscordError::ChannelNotFound(self.channel_id.clone()));
        }

        let channel: Channel = self.handle_response(response).await?;
        if !channel.is_forum() {
            return Err(DiscordError::NotForumChannel(self.channel_id.clone()));
        }

        self.verified.store(true, Ordering::Release);
        debug!(name = ?channel.name, "forum channel verified");
        Ok(channel)
    }

    /// Create a forum thread for `notification`.
    #[tracing::instrument(skip(self, notification), fields(job_id = %notification.job_id))]
    pub async fn post(&self, notification: &Notification) -> Result<Thread, DiscordError> {
        if !self.verified.load(Ordering::Acquire) {
            self.verify_channel().await?;
        }

        let url = format!("{}/channels/{}/threads", self.base_url, self.channel_id);
        let payload = CreateForumThread::from(notification);

        let response = self
            .http
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(&payload)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            // Channel was deleted since it was verified
            self.verified.store(false, Ordering::Release);
            return Err(DiscordError::ChannelNotFound(self.channel_id.clone()));
        }

        let thread: Thread = self.handle_response(response).await?;
        info!(thread_id = %thread.id, title = %notification.title, "posted job thread");
        Ok(thread)
    }

    /// Handle HTTP response and parse JSON.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, DiscordError> {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let header_secs = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<f64>().ok());
            let body_secs = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|b| b.retry_after);
            return Err(DiscordError::RateLimited {
                retry_after_secs: header_secs.or(body_secs).map(|s| s.ceil() as u64),
            });
        }

        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.message)
                .unwrap_or(text);
            return Err(DiscordError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl NotificationSink for ForumClient {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.post(notification).await?;
        Ok(())
    }
}
