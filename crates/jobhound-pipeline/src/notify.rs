//! Notification payload and sink capability.

use async_trait::async_trait;
use serde::Serialize;

use crate::{JobRecord, NotifyError};

/// Label of the action pointing at the application link.
pub const ACTION_LABEL: &str = "Offer Link";

/// A named value shown with the notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// A labeled link action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkAction {
    pub label: String,
    pub url: String,
}

/// Sink-independent notification for one new job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub job_id: String,
    pub title: String,
    pub description: String,
    pub fields: Vec<NotificationField>,
    /// `None` when the listing had no thumbnail.
    pub thumbnail_url: Option<String>,
    pub action: LinkAction,
    /// Free-text line naming the company and posting source.
    pub content: String,
}

impl Notification {
    /// Build the notification for a job, or `None` if it has no link.
    pub fn for_job(job: &JobRecord) -> Option<Self> {
        let url = job.resolved_link.clone()?;

        Some(Self {
            job_id: job.job_id.clone(),
            title: job.title.clone(),
            description: job.description.clone(),
            fields: vec![
                NotificationField {
                    name: "Posted At".to_string(),
                    value: job.posted_at.clone(),
                    inline: true,
                },
                NotificationField {
                    name: "Schedule Type".to_string(),
                    value: job.schedule_type.clone(),
                    inline: true,
                },
            ],
            thumbnail_url: Some(job.thumbnail_url.clone()).filter(|t| !t.is_empty()),
            action: LinkAction {
                label: ACTION_LABEL.to_string(),
                url,
            },
            content: format!("{} {}", job.company, job.via).trim().to_string(),
        })
    }
}

/// External system that displays notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;
}
