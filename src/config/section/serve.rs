//! `[serve]` section: development server settings.
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"
//! port = 3000                 # HTTP port
//! reload_port = 35729         # live-reload WebSocket port
//! ```

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    pub interface: IpAddr,
    /// HTTP port number.
    pub port: u16,
    /// WebSocket port for live-reload signaling.
    pub reload_port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            reload_port: 35729,
        }
    }
}
