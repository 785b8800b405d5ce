//! Discord notification sink for Jobhound.
//!
//! Each new job becomes a thread in a forum channel, with an embed carrying
//! the listing details and a link button pointing at the application page.

mod error;
mod forum;
mod types;

pub use error::DiscordError;
pub use forum::{DEFAULT_DISCORD_API_URL, ForumClient};
pub use types::*;
