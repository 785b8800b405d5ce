//! Configuration commands and caller authorization.

use std::collections::HashSet;

use jobhound_pipeline::{DEFAULT_LOCATION, DEFAULT_QUERY, LinkMethod, Settings, SettingsHandle};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

/// Header carrying the caller identity.
pub const CALLER_HEADER: &str = "X-Jobhound-Caller";

/// Reasons a command was rejected. The display text is the reply shown to
/// the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("You are not authorized to use this command.")]
    Unauthorized,

    #[error("{0}")]
    InvalidValue(String),
}

/// Current settings as shown to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsView {
    pub location: String,
    pub query: String,
    pub link_method: LinkMethod,
}

impl From<&Settings> for SettingsView {
    fn from(settings: &Settings) -> Self {
        Self {
            location: display_or_default(&settings.location, DEFAULT_LOCATION),
            query: display_or_default(&settings.query, DEFAULT_QUERY),
            link_method: settings.link_method,
        }
    }
}

fn display_or_default(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        format!("Default ({})", default)
    } else {
        value.to_string()
    }
}

/// Reply to a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandReply {
    pub ok: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<SettingsView>,
}

impl CommandReply {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            settings: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            settings: None,
        }
    }
}

impl From<CommandError> for CommandReply {
    fn from(err: CommandError) -> Self {
        Self::error(err.to_string())
    }
}

/// Applies configuration commands for allow-listed callers.
#[derive(Debug, Clone)]
pub struct Commands {
    settings: SettingsHandle,
    allowed_callers: HashSet<String>,
}

impl Commands {
    pub fn new(
        settings: SettingsHandle,
        allowed_callers: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            settings,
            allowed_callers: allowed_callers
                .into_iter()
                .map(Into::into)
                .filter(|c: &String| !c.trim().is_empty())
                .collect(),
        }
    }

    pub fn settings_handle(&self) -> &SettingsHandle {
        &self.settings
    }

    /// Check `caller` against the allow-list.
    pub fn authorize(&self, caller: Option<&str>) -> Result<(), CommandError> {
        match caller {
            Some(id) if self.allowed_callers.contains(id) => Ok(()),
            _ => {
                warn!(caller = ?caller, "rejected command from unauthorized caller");
                Err(CommandError::Unauthorized)
            }
        }
    }

    pub fn set_link_method(
        &self,
        caller: Option<&str>,
        method: &str,
    ) -> Result<CommandReply, CommandError> {
        self.authorize(caller)?;

        let method: LinkMethod = method.trim().parse().map_err(|_| {
            CommandError::InvalidValue(
                "Invalid method. Please use 'api' or 'scraping'.".to_string(),
            )
        })?;

        self.settings.set_link_method(method);
        info!(caller = ?caller, %method, "link method changed");
        Ok(CommandReply::success(format!(
            "Default job link method set to: {}",
            method
        )))
    }

    pub fn update_location(
        &self,
        caller: Option<&str>,
        location: &str,
    ) -> Result<CommandReply, CommandError> {
        self.authorize(caller)?;

        let location = location.trim();
        self.settings.set_location(location);
        info!(caller = ?caller, location, "location changed");
        Ok(CommandReply::success(format!("Location updated to {}", location)))
    }

    pub fn update_query(
        &self,
        caller: Option<&str>,
        query: &str,
    ) -> Result<CommandReply, CommandError> {
        self.authorize(caller)?;

        let query = query.trim();
        self.settings.set_query(query);
        info!(caller = ?caller, query, "query changed");
        Ok(CommandReply::success(format!("Query updated to {}", query)))
    }

    /// Show the current settings.
    pub fn show_settings(&self, caller: Option<&str>) -> Result<CommandReply, CommandError> {
        self.authorize(caller)?;

        let view = SettingsView::from(self.settings.snapshot().as_ref());
        let message = format!(
            "Location: {}\nQuery: {}\nLink method: {}",
            view.location, view.query, view.link_method
        );
        Ok(CommandReply {
            ok: true,
            message,
            settings: Some(view),
        })
    }
}
