//! WebSocket listener for live reload.

use std::net::{IpAddr, SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use super::ReloadHub;
use crate::core::is_shutdown;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Bind the listener and hand accepted sockets to the hub.
///
/// Returns the port actually bound, which may be above `base_port` when
/// that one is busy.
pub fn start_ws_server(hub: Arc<ReloadHub>, interface: IpAddr, base_port: u16) -> Result<u16> {
    let (listener, actual_port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        while !is_shutdown() {
            match listener.accept() {
                Ok((stream, addr)) => {
                    crate::debug!("reload"; "client connected: {}", addr);
                    let _ = stream.set_nonblocking(false);
                    hub.add_client(stream);
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    crate::log!("reload"; "accept error: {}", e);
                    std::thread::sleep(Duration::from_millis(100));
                }
            }
        }
    });

    Ok(actual_port)
}

/// Try binding to port, retry with incremented port if in use
pub(crate) fn try_bind_port(
    interface: IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(SocketAddr::new(interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "failed to bind {} after {} attempts: {}",
        interface,
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_busy_port_moves_up() {
        let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let (taken, port) = try_bind_port(localhost, 0, 1).unwrap();
        let base = taken.local_addr().unwrap().port();
        assert_eq!(port, base);

        // base is busy; the next free port at or above it is chosen
        let (_second, next) = try_bind_port(localhost, base, 10).unwrap();
        assert!(next > base && next < base + 10);
    }
}
