//! Live reload message protocol.
//!
//! - `connected`: sent once after the handshake
//! - `reload`: full page reload
//! - `css`: re-fetch matching stylesheets in place
//! - `error`: a task failed (logged by the client)

use serde::{Deserialize, Serialize};

use super::Change;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    Connected { version: String },
    Reload { path: String },
    Css { path: String },
    Error { task: String, error: String },
}

impl ReloadMessage {
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload","path":"/"}"#.to_string())
    }

    #[cfg(test)]
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

impl From<Change> for ReloadMessage {
    fn from(change: Change) -> Self {
        match change {
            Change::Reload { path } => Self::Reload { path },
            Change::Css { path } => Self::Css { path },
            Change::Failed { task, message } => Self::Error {
                task,
                error: message,
            },
        }
    }
}
