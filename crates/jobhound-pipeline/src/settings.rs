//! Runtime search settings shared between the scheduler and command handlers.
//!
//! Settings are held as an immutable [`Settings`] value behind an `Arc`.
//! Every update builds a whole new value and installs it in one step, and
//! every reader takes the current `Arc` at the start of use, so a reader can
//! never see fields from two different updates.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::SettingsError;

/// Location searched when none is configured.
pub const DEFAULT_LOCATION: &str = "Texas";

/// Query searched when none is configured.
pub const DEFAULT_QUERY: &str = "Junior Data Analyst";

/// Strategy used to find an application link for a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkMethod {
    /// Ask the listing-detail provider for apply options.
    #[default]
    Api,
    /// Web-search for the description text.
    #[serde(rename = "scraping")]
    Scrape,
}

impl LinkMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkMethod::Api => "api",
            LinkMethod::Scrape => "scraping",
        }
    }
}

impl fmt::Display for LinkMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkMethod {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "api" => Ok(LinkMethod::Api),
            "scraping" | "scrape" => Ok(LinkMethod::Scrape),
            _ => Err(SettingsError::UnknownLinkMethod(s.to_string())),
        }
    }
}

/// One consistent set of search settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Location as written; may be empty.
    pub location: String,
    /// Query as written; may be empty.
    pub query: String,
    pub link_method: LinkMethod,
}

impl Settings {
    pub fn new(
        location: impl Into<String>,
        query: impl Into<String>,
        link_method: LinkMethod,
    ) -> Self {
        Self {
            location: location.into(),
            query: query.into(),
            link_method,
        }
    }

    /// Location to search, falling back to [`DEFAULT_LOCATION`].
    pub fn effective_location(&self) -> &str {
        if self.location.trim().is_empty() {
            DEFAULT_LOCATION
        } else {
            &self.location
        }
    }

    /// Query to search, falling back to [`DEFAULT_QUERY`].
    pub fn effective_query(&self) -> &str {
        if self.query.trim().is_empty() {
            DEFAULT_QUERY
        } else {
            &self.query
        }
    }
}

/// Shared handle to the current [`Settings`].
///
/// Cloning the handle shares the same underlying value.
#[derive(Clone)]
pub struct SettingsHandle {
    tx: Arc<watch::Sender<Arc<Settings>>>,
}

impl SettingsHandle {
    pub fn new(initial: Settings) -> Self {
        let (tx, _) = watch::channel(Arc::new(initial));
        Self { tx: Arc::new(tx) }
    }

    /// The current settings. Later updates do not affect the returned value.
    pub fn snapshot(&self) -> Arc<Settings> {
        Arc::clone(&self.tx.borrow())
    }

    /// Subscribe to settings changes.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Settings>> {
        self.tx.subscribe()
    }

    /// Replace all settings at once.
    pub fn replace(&self, settings: Settings) -> Arc<Settings> {
        let settings = Arc::new(settings);
        self.tx.send_replace(Arc::clone(&settings));
        settings
    }

    pub fn set_location(&self, location: impl Into<String>) -> Arc<Settings> {
        let location = location.into();
        self.update(|s| s.location = location)
    }

    pub fn set_query(&self, query: impl Into<String>) -> Arc<Settings> {
        let query = query.into();
        self.update(|s| s.query = query)
    }

    pub fn set_link_method(&self, link_method: LinkMethod) -> Arc<Settings> {
        self.update(|s| s.link_method = link_method)
    }

    /// Build a new value from the current one and install it.
    ///
    /// The read and the install happen under the channel's write lock, so
    /// concurrent updates to different fields are never lost.
    fn update(&self, change: impl FnOnce(&mut Settings)) -> Arc<Settings> {
        let mut installed = None;
        self.tx.send_modify(|current| {
            let mut next = Settings::clone(current);
            change(&mut next);
            let next = Arc::new(next);
            installed = Some(Arc::clone(&next));
            *current = next;
        });
        installed.unwrap_or_else(|| self.snapshot())
    }
}

impl fmt::Debug for SettingsHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SettingsHandle")
            .field(&*self.snapshot())
            .finish()
    }
}
