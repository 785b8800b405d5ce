//! Search provider adapters for Jobhound.
//!
//! - **SerpApi**: Google Jobs search (the job source) and Google Jobs
//!   listing detail (apply options for the API link strategy)
//! - **Custom Search**: Google Programmable Search, used by the scrape
//!   link strategy

mod custom_search;
mod error;
mod serpapi;
mod types;

pub use custom_search::{CustomSearchClient, DEFAULT_CUSTOM_SEARCH_URL};
pub use error::SearchError;
pub use serpapi::{DEFAULT_SERPAPI_URL, SerpApiClient};
pub use types::*;
