//! Live reload for the dev server.
//!
//! Transform tasks report what they wrote through [`ReloadSink`]; in watch
//! mode the sink is the WebSocket [`ReloadHub`], which pushes JSON messages
//! to every connected page.
//!
//! ```text
//! task ──Change──▶ ReloadHub ──{"type":"css",...}──▶ browsers
//!                     ▲
//!        server ──────┘ (accepted sockets)
//! ```
//!
//! - `message` - JSON wire format
//! - `hub` - client registry and broadcast
//! - `server` - WebSocket listener

mod hub;
pub mod message;
mod server;

pub use hub::ReloadHub;
pub use message::ReloadMessage;
pub use server::start_ws_server;

/// A finished change worth telling the browser about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Reload the page; `path` is the site URL that changed.
    Reload { path: String },
    /// Re-fetch stylesheets matching `path` without reloading.
    Css { path: String },
    /// A task failed; shown in the browser console.
    Failed { task: String, message: String },
}

/// Receiver of change notifications.
pub trait ReloadSink: Send + Sync {
    fn notify(&self, change: Change);
}

/// Sink for one-shot builds.
pub struct NoReload;

impl ReloadSink for NoReload {
    fn notify(&self, _change: Change) {}
}
