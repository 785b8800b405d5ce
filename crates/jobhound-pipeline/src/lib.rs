//! Job listing ingestion pipeline for Jobhound.
//!
//! This crate provides the periodic cycle that:
//! - Fetches "posted today" listings from a job search provider
//! - Filters out listings already seen, using a durable ID set
//! - Resolves an application link per new listing (API or scrape strategy)
//! - Hands a rendered notification to an external sink
//!
//! Concrete providers and sinks live in their own crates and plug in
//! through the [`JobSource`], [`ListingDetails`], [`WebSearch`] and
//! [`NotificationSink`] traits.

mod dedup;
mod error;
mod notify;
mod resolver;
mod scheduler;
mod settings;
mod source;
mod types;

pub use dedup::DedupStore;
pub use error::{NotifyError, PipelineError, SettingsError, SourceError, StoreError};
pub use notify::{ACTION_LABEL, LinkAction, Notification, NotificationField, NotificationSink};
pub use resolver::{LinkResolver, ListingDetail, ListingDetails, WebSearch, choose_link};
pub use scheduler::{CycleOutcome, CycleReport, DEFAULT_INTERVAL_SECS, Scheduler, SchedulerState};
pub use settings::{DEFAULT_LOCATION, DEFAULT_QUERY, LinkMethod, Settings, SettingsHandle};
pub use source::JobSource;
pub use types::{
    DESCRIPTION_LIMIT, JobRecord, ListingFields, NOT_AVAILABLE, QUERY_EXCERPT_LIMIT, RelatedLink,
    TRUNCATION_MARKER, excerpt, truncate_description,
};
