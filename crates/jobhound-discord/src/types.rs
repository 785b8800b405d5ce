//! Discord API payloads.

use jobhound_pipeline::Notification;
use serde::{Deserialize, Serialize};

/// Channel type of a forum channel.
pub const GUILD_FORUM: u8 = 15;

/// Embed sidebar color (blue).
pub const EMBED_COLOR: u32 = 0x3498DB;

/// Discord limits, counted in characters.
pub const THREAD_NAME_LIMIT: usize = 100;
pub const EMBED_TITLE_LIMIT: usize = 256;
pub const EMBED_DESCRIPTION_LIMIT: usize = 4096;

const COMPONENT_ACTION_ROW: u8 = 1;
const COMPONENT_BUTTON: u8 = 2;
const BUTTON_STYLE_LINK: u8 = 5;

/// The subset of a channel object we look at.
#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub name: Option<String>,
}

impl Channel {
    pub fn is_forum(&self) -> bool {
        self.kind == GUILD_FORUM
    }
}

/// Body of `POST /channels/{id}/threads` for a forum channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateForumThread {
    pub name: String,
    pub message: ForumMessage,
}

/// Starter message of a forum thread.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForumMessage {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,
    pub embeds: Vec<Embed>,
    pub components: Vec<ActionRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedThumbnail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedThumbnail {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRow {
    #[serde(rename = "type")]
    pub kind: u8,
    pub components: Vec<Button>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Button {
    #[serde(rename = "type")]
    pub kind: u8,
    pub style: u8,
    pub label: String,
    pub url: String,
}

impl Button {
    /// A button that opens `url`.
    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind: COMPONENT_BUTTON,
            style: BUTTON_STYLE_LINK,
            label: label.into(),
            url: url.into(),
        }
    }
}

/// Minimal thread object returned on creation.
#[derive(Debug, Clone, Deserialize)]
pub struct Thread {
    pub id: String,
}

/// Discord error body.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default)]
    pub retry_after: Option<f64>,
}

fn clamp(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

impl From<&Notification> for CreateForumThread {
    fn from(n: &Notification) -> Self {
        let embed = Embed {
            title: clamp(&n.title, EMBED_TITLE_LIMIT),
            description: clamp(&n.description, EMBED_DESCRIPTION_LIMIT),
            color: EMBED_COLOR,
            fields: n
                .fields
                .iter()
                .map(|f| EmbedField {
                    name: f.name.clone(),
                    value: f.value.clone(),
                    inline: f.inline,
                })
                .collect(),
            thumbnail: n
                .thumbnail_url
                .as_ref()
                .map(|url| EmbedThumbnail { url: url.clone() }),
        };

        Self {
            name: clamp(&n.title, THREAD_NAME_LIMIT),
            message: ForumMessage {
                content: n.content.clone(),
                embeds: vec![embed],
                components: vec![ActionRow {
                    kind: COMPONENT_ACTION_ROW,
                    components: vec![Button::link(&n.action.label, &n.action.url)],
                }],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobhound_pipeline::{JobRecord, ListingFields};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn notification(title: &str, thumbnail: Option<&str>) -> Notification {
        let mut job = JobRecord::from(ListingFields {
            job_id: "job-1".to_string(),
            title: Some(title.to_string()),
            company: Some("Acme".to_string()),
            via: Some("via Indeed".to_string()),
            description: Some("Build dashboards".to_string()),
            posted_at: Some("1 hour ago".to_string()),
            schedule_type: Some("Full-time".to_string()),
            thumbnail_url: thumbnail.map(str::to_string),
            related_links: Vec::new(),
        });
        job.resolved_link = Some("https://acme.example/apply".to_string());
        Notification::for_job(&job).unwrap()
    }

    #[test]
    fn test_thread_payload_shape() {
        let payload = CreateForumThread::from(&notification(
            "Data Analyst",
            Some("https://img.example/acme.png"),
        ));

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "name": "Data Analyst",
                "message": {
                    "content": "Acme via Indeed",
                    "embeds": [{
                        "title": "Data Analyst",
                        "description": "Build dashboards",
                        "color": 0x3498DB,
                        "fields": [
                            {"name": "Posted At", "value": "1 hour ago", "inline": true},
                            {"name": "Schedule Type", "value": "Full-time", "inline": true}
                        ],
                        "thumbnail": {"url": "https://img.example/acme.png"}
                    }],
                    "components": [{
                        "type": 1,
                        "components": [{
                            "type": 2,
                            "style": 5,
                            "label": "Offer Link",
                            "url": "https://acme.example/apply"
                        }]
                    }]
                }
            })
        );
    }

    #[test]
    fn test_thumbnail_omitted_when_absent() {
        let payload = CreateForumThread::from(&notification("Analyst", None));
        let value = serde_json::to_value(&payload).unwrap();

        assert!(value["message"]["embeds"][0].get("thumbnail").is_none());
    }

    #[test]
    fn test_long_title_clamped_for_thread_name() {
        let title = "é".repeat(150);
        let payload = CreateForumThread::from(&notification(&title, None));

        assert_eq!(payload.name.chars().count(), THREAD_NAME_LIMIT);
        assert_eq!(payload.message.embeds[0].title, title);
    }

    #[test]
    fn test_channel_kind() {
        let forum: Channel = serde_json::from_value(json!({"id": "1", "type": 15})).unwrap();
        let text: Channel = serde_json::from_value(json!({"id": "2", "type": 0})).unwrap();

        assert!(forum.is_forum());
        assert!(!text.is_forum());
    }
}
