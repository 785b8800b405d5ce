//! Pipeline types.

use serde::{Deserialize, Serialize};

/// Maximum number of characters kept from a job description.
pub const DESCRIPTION_LIMIT: usize = 4092;

/// Maximum number of characters of the description used as scrape query text.
pub const QUERY_EXCERPT_LIMIT: usize = 2380;

/// Appended to a description that was cut at [`DESCRIPTION_LIMIT`].
pub const TRUNCATION_MARKER: &str = "...";

/// Placeholder for free-text fields the provider left out.
pub const NOT_AVAILABLE: &str = "N/A";

/// A link the provider attached to a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedLink {
    pub label: String,
    pub url: String,
}

/// A normalized job listing from one provider response.
///
/// Every field has a concrete value; defaults are applied when the record is
/// built from [`ListingFields`], so nothing downstream checks for presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Provider-assigned identifier, stable across polls.
    pub job_id: String,
    pub title: String,
    pub company: String,
    /// Posting source label (e.g. "via LinkedIn").
    pub via: String,
    /// Description cut to [`DESCRIPTION_LIMIT`] characters.
    pub description: String,
    /// Independently cut excerpt, only used for scrape link resolution.
    pub query_excerpt: String,
    pub posted_at: String,
    pub schedule_type: String,
    /// Possibly empty.
    pub thumbnail_url: String,
    pub related_links: Vec<RelatedLink>,
    /// Filled in by the pipeline; `None` means no link could be found.
    pub resolved_link: Option<String>,
}

/// Raw listing fields as a provider returns them, all optional.
#[derive(Debug, Clone, Default)]
pub struct ListingFields {
    pub job_id: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub via: Option<String>,
    pub description: Option<String>,
    pub posted_at: Option<String>,
    pub schedule_type: Option<String>,
    pub thumbnail_url: Option<String>,
    pub related_links: Vec<RelatedLink>,
}

impl From<ListingFields> for JobRecord {
    fn from(fields: ListingFields) -> Self {
        let description = fields
            .description
            .as_deref()
            .map_or_else(|| NOT_AVAILABLE.to_string(), truncate_description);
        let raw_description = fields.description.unwrap_or_default();

        Self {
            job_id: fields.job_id,
            title: fields.title.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            company: fields.company.unwrap_or_default(),
            via: fields.via.unwrap_or_default(),
            query_excerpt: excerpt(&raw_description, QUERY_EXCERPT_LIMIT).to_string(),
            description,
            posted_at: fields.posted_at.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            schedule_type: fields
                .schedule_type
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            thumbnail_url: fields.thumbnail_url.unwrap_or_default(),
            related_links: fields.related_links,
            resolved_link: None,
        }
    }
}

/// Cut a description to [`DESCRIPTION_LIMIT`] characters, marking the cut.
///
/// Descriptions at or under the limit are returned unchanged.
pub fn truncate_description(text: &str) -> String {
    let kept = excerpt(text, DESCRIPTION_LIMIT);
    if kept.len() < text.len() {
        format!("{}{}", kept, TRUNCATION_MARKER)
    } else {
        text.to_string()
    }
}

/// The first `limit` characters of `text`, split on a char boundary.
pub fn excerpt(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(job_id: &str) -> ListingFields {
        ListingFields {
            job_id: job_id.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_truncate_long_description() {
        let text = "a".repeat(5000);
        let truncated = truncate_description(&text);

        assert_eq!(truncated.chars().count(), DESCRIPTION_LIMIT + TRUNCATION_MARKER.len());
        assert!(truncated.starts_with(&"a".repeat(DESCRIPTION_LIMIT)));
        assert!(truncated.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_truncate_short_description_unchanged() {
        let text = "b".repeat(4000);
        assert_eq!(truncate_description(&text), text);
    }

    #[test]
    fn test_truncate_exact_limit_unchanged() {
        let text = "c".repeat(DESCRIPTION_LIMIT);
        assert_eq!(truncate_description(&text), text);
    }

    #[test]
    fn test_excerpt_counts_chars_not_bytes() {
        let text = "é".repeat(10);
        assert_eq!(excerpt(&text, 3), "ééé");
        assert_eq!(excerpt(&text, 50), text);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let job = JobRecord::from(fields("abc"));

        assert_eq!(job.job_id, "abc");
        assert_eq!(job.title, NOT_AVAILABLE);
        assert_eq!(job.description, NOT_AVAILABLE);
        assert_eq!(job.posted_at, NOT_AVAILABLE);
        assert_eq!(job.schedule_type, NOT_AVAILABLE);
        assert_eq!(job.thumbnail_url, "");
        assert_eq!(job.query_excerpt, "");
        assert!(job.related_links.is_empty());
        assert!(job.resolved_link.is_none());
    }

    #[test]
    fn test_excerpt_is_cut_independently() {
        let description = "x".repeat(3000);
        let job = JobRecord::from(ListingFields {
            description: Some(description.clone()),
            ..fields("abc")
        });

        assert_eq!(job.description, description);
        assert_eq!(job.query_excerpt.chars().count(), QUERY_EXCERPT_LIMIT);
    }

    #[test]
    fn test_present_empty_description_kept() {
        let job = JobRecord::from(ListingFields {
            description: Some(String::new()),
            ..fields("abc")
        });

        assert_eq!(job.description, "");
        assert_eq!(job.query_excerpt, "");
    }
}
