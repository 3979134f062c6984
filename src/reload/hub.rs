//! Connected live-reload clients.

use std::io::ErrorKind;
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::{Change, ReloadMessage, ReloadSink};
use crate::core::is_shutdown;

/// Client poll interval of the reader thread.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Registry of browser sockets; broadcasts every [`Change`] it receives.
pub struct ReloadHub {
    clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>,
}

impl ReloadHub {
    /// Create the hub and its reader thread.
    ///
    /// The reader answers pings and drops clients that closed.
    pub fn start() -> Arc<Self> {
        let hub = Arc::new(Self {
            clients: Arc::new(Mutex::new(Vec::new())),
        });
        let clients = Arc::clone(&hub.clients);
        std::thread::spawn(move || reader_loop(&clients));
        hub
    }

    /// Complete the WebSocket handshake and register the client.
    pub fn add_client(&self, stream: TcpStream) {
        match tungstenite::accept(stream) {
            Ok(mut ws) => {
                let _ = ws.get_ref().set_nonblocking(true);

                let hello = ReloadMessage::connected().to_json();
                if let Err(e) = ws.send(Message::Text(hello.into())) {
                    crate::debug!("reload"; "failed to greet client: {}", e);
                    return;
                }

                let mut clients = self.clients.lock();
                clients.push(ws);
                crate::debug!("reload"; "client connected (total: {})", clients.len());
            }
            Err(e) => crate::log!("reload"; "handshake failed: {}", e),
        }
    }

    /// Send to every client, dropping the ones that fail. A client whose
    /// socket is only full keeps the frame queued; the next write flushes
    /// it first. Returns the number of clients kept.
    pub fn broadcast(&self, message: &ReloadMessage) -> usize {
        let text = message.to_json();
        let mut clients = self.clients.lock();
        clients.retain_mut(|ws| match ws.send(Message::Text(text.clone().into())) {
            Ok(()) => true,
            Err(e) if is_backpressure(&e) => {
                crate::debug!("reload"; "client busy, message queued");
                true
            }
            Err(e) => {
                crate::debug!("reload"; "client dropped: {}", e);
                false
            }
        });
        clients.len()
    }

    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    /// Close every socket.
    pub fn close_all(&self) {
        for mut ws in self.clients.lock().drain(..) {
            let _ = ws.close(None);
            let _ = ws.flush();
        }
    }
}

impl ReloadSink for ReloadHub {
    fn notify(&self, change: Change) {
        let message = ReloadMessage::from(change);
        let reached = self.broadcast(&message);
        crate::debug!("reload"; "{} -> {} client(s)", message.to_json(), reached);
    }
}

fn reader_loop(clients: &Mutex<Vec<WebSocket<TcpStream>>>) {
    while !is_shutdown() {
        std::thread::sleep(POLL_INTERVAL);

        clients.lock().retain_mut(|ws| match ws.read() {
            Ok(Message::Close(_)) => false,
            Ok(_) => true,
            Err(ref e) if would_block(e) => true,
            Err(_) => false,
        });
    }
}

fn would_block(e: &tungstenite::Error) -> bool {
    matches!(e, tungstenite::Error::Io(io) if io.kind() == ErrorKind::WouldBlock)
}

/// The peer is alive but not draining its socket fast enough.
fn is_backpressure(e: &tungstenite::Error) -> bool {
    would_block(e) || matches!(e, tungstenite::Error::WriteBufferFull(_))
}
