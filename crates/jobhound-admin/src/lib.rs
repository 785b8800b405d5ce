//! Runtime configuration surface for Jobhound.
//!
//! [`Commands`] holds the authorization allow-list and applies settings
//! changes; [`http`] exposes the commands over an axum router.

mod commands;
pub mod http;

pub use commands::{CALLER_HEADER, CommandError, CommandReply, Commands, SettingsView};
pub use http::{AdminState, create_router, run_server};
