//! Development server for the build root.
//!
//! Static files only; pages get the live-reload client injected and the
//! client itself is served from memory.

mod inject;
mod path;
mod response;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tiny_http::{Request, Server};

use crate::config::ProjectConfig;
use crate::embed::serve::LIVERELOAD_URL;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Request handler threads.
const WORKERS: usize = 4;

/// Bound server ready to accept requests
pub struct DevServer {
    server: Arc<Server>,
    addr: SocketAddr,
    root: PathBuf,
    ws_port: u16,
}

/// Bind the HTTP server without starting the request loop.
pub fn bind(config: &ProjectConfig, ws_port: u16) -> Result<DevServer> {
    let (server, addr) = bind_with_retry(config.serve.interface, config.serve.port)?;
    crate::log!("serve"; "http://{}", addr);

    Ok(DevServer {
        server: Arc::new(server),
        addr,
        root: config.build_root(),
        ws_port,
    })
}

/// Bind to the interface and port, trying the following ports when busy.
fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        match Server::http(SocketAddr::new(interface, port)) {
            Ok(server) => {
                if offset > 0 {
                    crate::log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                // Port 0 picks a free port; report the real one.
                let addr = server
                    .server_addr()
                    .to_ip()
                    .unwrap_or_else(|| SocketAddr::new(interface, port));
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

impl DevServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Handle for shutdown (`Server::unblock`).
    pub fn handle(&self) -> Arc<Server> {
        Arc::clone(&self.server)
    }

    /// Serve requests until the server is unblocked.
    pub fn run(self) -> Result<()> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(WORKERS)
            .thread_name(|i| format!("serve-{i}"))
            .build()?;

        let root = Arc::new(self.root);
        for request in self.server.incoming_requests() {
            let root = Arc::clone(&root);
            let ws_port = self.ws_port;
            pool.spawn(move || {
                if let Err(e) = handle_request(request, &root, ws_port) {
                    crate::log!("serve"; "request error: {e}");
                }
            });
        }
        Ok(())
    }
}

fn handle_request(request: Request, root: &std::path::Path, ws_port: u16) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    crate::debug!("serve"; "{} {}", request.method(), request.url());

    if request.url().split('?').next() == Some(LIVERELOAD_URL) {
        return response::respond_livereload_js(request, ws_port);
    }

    match path::resolve_path(request.url(), root) {
        Some(path) => response::respond_file(request, &path),
        None => response::respond_not_found(request),
    }
}
