//! Provider response types.
//!
//! Every field is optional; missing keys become explicit defaults when a
//! result is converted into pipeline types.

use jobhound_pipeline::{ListingDetail, ListingFields, RelatedLink};
use serde::Deserialize;

/// Response from `engine=google_jobs`.
#[derive(Debug, Default, Deserialize)]
pub struct JobsSearchResponse {
    #[serde(default)]
    pub jobs_results: Vec<JobResult>,
}

/// One entry of `jobs_results`.
#[derive(Debug, Default, Deserialize)]
pub struct JobResult {
    pub job_id: Option<String>,
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub via: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub detected_extensions: DetectedExtensions,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub related_links: Vec<RelatedLinkResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DetectedExtensions {
    pub posted_at: Option<String>,
    pub schedule_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RelatedLinkResult {
    pub link: Option<String>,
    pub text: Option<String>,
}

impl JobResult {
    /// Convert into pipeline fields. Results without a job ID are dropped,
    /// since they cannot be deduplicated.
    pub fn into_fields(self) -> Option<ListingFields> {
        let job_id = self.job_id.filter(|id| !id.is_empty())?;

        Some(ListingFields {
            job_id,
            title: self.title,
            company: self.company_name,
            via: self.via,
            description: self.description,
            posted_at: self.detected_extensions.posted_at,
            schedule_type: self.detected_extensions.schedule_type,
            thumbnail_url: self.thumbnail,
            related_links: self
                .related_links
                .into_iter()
                .filter_map(|l| {
                    let url = l.link.filter(|u| !u.is_empty())?;
                    Some(RelatedLink {
                        label: l.text.unwrap_or_default(),
                        url,
                    })
                })
                .collect(),
        })
    }
}

/// Response from `engine=google_jobs_listing`.
#[derive(Debug, Default, Deserialize)]
pub struct ListingResponse {
    #[serde(default)]
    pub apply_options: Vec<ApplyOption>,
    pub search_metadata: Option<SearchMetadata>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplyOption {
    pub title: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchMetadata {
    pub google_jobs_listing_url: Option<String>,
}

impl From<ListingResponse> for ListingDetail {
    fn from(response: ListingResponse) -> Self {
        Self {
            apply_links: response
                .apply_options
                .into_iter()
                .filter_map(|o| o.link.filter(|l| !l.is_empty()))
                .collect(),
            listing_url: response
                .search_metadata
                .and_then(|m| m.google_jobs_listing_url)
                .unwrap_or_default(),
        }
    }
}

/// Response from the Custom Search JSON API.
#[derive(Debug, Default, Deserialize)]
pub struct CustomSearchResponse {
    #[serde(default)]
    pub items: Vec<CustomSearchItem>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomSearchItem {
    pub title: Option<String>,
    pub link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_job_result_full() {
        let result: JobResult = serde_json::from_value(json!({
            "job_id": "eyJqb2JfdGl0bGUiOiJEYXRh",
            "title": "Data Analyst",
            "company_name": "Acme",
            "via": "via LinkedIn",
            "description": "Analyze things.",
            "detected_extensions": {
                "posted_at": "5 hours ago",
                "schedule_type": "Full-time"
            },
            "thumbnail": "https://img.example/acme.png",
            "related_links": [
                {"link": "https://acme.example", "text": "acme.example"},
                {"text": "no link"}
            ]
        }))
        .unwrap();

        let fields = result.into_fields().unwrap();
        assert_eq!(fields.job_id, "eyJqb2JfdGl0bGUiOiJEYXRh");
        assert_eq!(fields.company.as_deref(), Some("Acme"));
        assert_eq!(fields.posted_at.as_deref(), Some("5 hours ago"));
        assert_eq!(fields.schedule_type.as_deref(), Some("Full-time"));
        assert_eq!(
            fields.related_links,
            vec![RelatedLink {
                label: "acme.example".to_string(),
                url: "https://acme.example".to_string(),
            }]
        );
    }

    #[test]
    fn test_job_result_sparse() {
        let result: JobResult = serde_json::from_value(json!({"job_id": "abc"})).unwrap();
        let fields = result.into_fields().unwrap();

        assert_eq!(fields.job_id, "abc");
        assert!(fields.title.is_none());
        assert!(fields.posted_at.is_none());
        assert!(fields.related_links.is_empty());
    }

    #[test]
    fn test_job_result_without_id_is_dropped() {
        let result: JobResult = serde_json::from_value(json!({"title": "No id"})).unwrap();
        assert!(result.into_fields().is_none());
    }

    #[test]
    fn test_listing_detail_conversion() {
        let response: ListingResponse = serde_json::from_value(json!({
            "search_metadata": {
                "google_jobs_listing_url": "https://www.google.com/search?ibp=htl;jobs#htidocid=abc"
            },
            "apply_options": [
                {"title": "Apply on LinkedIn", "link": "https://linkedin.example/apply"},
                {"title": "Apply on Indeed", "link": "https://indeed.example/apply"}
            ]
        }))
        .unwrap();

        let detail = ListingDetail::from(response);
        assert_eq!(
            detail.apply_links,
            vec![
                "https://linkedin.example/apply".to_string(),
                "https://indeed.example/apply".to_string()
            ]
        );
        assert!(detail.listing_url.contains("htidocid=abc"));
    }

    #[test]
    fn test_listing_detail_without_options() {
        let response: ListingResponse = serde_json::from_value(json!({})).unwrap();
        let detail = ListingDetail::from(response);

        assert!(detail.apply_links.is_empty());
        assert_eq!(detail.listing_url, "");
    }
}
