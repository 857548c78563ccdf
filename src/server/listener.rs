use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tracing::{error, info, warn};

use crate::handler::Handler;
use crate::http::connection::Connection;
use crate::http::headers::HeaderMap;
use crate::http::mime;

/// Backlog used when `accept` has to start listening on its own.
pub const DEFAULT_BACKLOG: u32 = 128;

/// Pause after a failed accept so a persistent failure does not spin.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

pub const DEFAULT_SERVER_NAME: &str = concat!("porthole/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Created,
    Bound,
    Listening,
}

/// Owns the listening socket and hands each accepted client to its own task.
///
/// Lifecycle failures do not return errors. `bind` returns port 0 and
/// `listen`/`accept` report failure, and the message is kept in
/// [`error`](ConnectionServer::error) until the next failure replaces it.
pub struct ConnectionServer {
    address: IpAddr,
    state: ServerState,
    socket: Option<TcpSocket>,
    listener: Option<TcpListener>,
    port: u16,
    error: Option<String>,
    headers: HeaderMap,
}

impl ConnectionServer {
    pub fn new(address: IpAddr) -> Self {
        let mut headers = HeaderMap::new();
        headers.set("Server", DEFAULT_SERVER_NAME);

        Self {
            address,
            state: ServerState::Created,
            socket: None,
            listener: None,
            port: 0,
            error: None,
            headers,
        }
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    /// The bound port, 0 before a successful `bind`.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The most recent lifecycle failure.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Headers copied onto every response, `Server` among them.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        match (&self.listener, &self.socket) {
            (Some(listener), _) => listener.local_addr().ok(),
            (None, Some(socket)) => socket.local_addr().ok(),
            (None, None) => None,
        }
    }

    /// Binds to `port` on the configured address. Returns the port, or 0 on
    /// failure (port 0 itself is refused).
    pub fn bind(&mut self, port: u16) -> u16 {
        if port == 0 {
            self.fail("refusing to bind port 0");
            return 0;
        }

        if self.state != ServerState::Created {
            self.fail(format!("already bound to port {}", self.port));
            return 0;
        }

        let addr = SocketAddr::new(self.address, port);
        match bind_socket(addr) {
            Ok(socket) => {
                self.socket = Some(socket);
                self.state = ServerState::Bound;
                self.port = port;
                info!("Bound to {}", addr);
                port
            }
            Err(err) => {
                self.fail(format!("bind {}: {}", addr, err));
                0
            }
        }
    }

    /// Starts listening. Returns `true` if the server is listening
    /// afterwards; calling it again once listening is a no-op.
    pub fn listen(&mut self, backlog: u32) -> bool {
        match self.state {
            ServerState::Listening => true,
            ServerState::Created => {
                self.fail("listen called before bind");
                false
            }
            ServerState::Bound => {
                let Some(socket) = self.socket.take() else {
                    self.state = ServerState::Created;
                    self.port = 0;
                    self.fail("bound socket missing");
                    return false;
                };

                match socket.listen(backlog) {
                    Ok(listener) => {
                        self.listener = Some(listener);
                        self.state = ServerState::Listening;
                        info!("Listening on port {} (backlog {})", self.port, backlog);
                        true
                    }
                    Err(err) => {
                        // The socket is consumed by the failed call.
                        self.fail(format!("listen on port {}: {}", self.port, err));
                        self.state = ServerState::Created;
                        self.port = 0;
                        false
                    }
                }
            }
        }
    }

    /// Waits for the next client, listening first if needed.
    pub async fn accept(&mut self) -> Option<(TcpStream, SocketAddr)> {
        if !self.listen(DEFAULT_BACKLOG) {
            return None;
        }

        let accepted = self.listener.as_ref()?.accept().await;
        match accepted {
            Ok(accepted) => Some(accepted),
            Err(err) => {
                self.fail(format!("accept: {}", err));
                None
            }
        }
    }

    /// Accept loop: every client is served on its own task by `handler`.
    ///
    /// Only returns if the server cannot listen.
    pub async fn serve(&mut self, handler: Arc<dyn Handler>) -> anyhow::Result<()> {
        if !self.listen(DEFAULT_BACKLOG) {
            anyhow::bail!(
                "cannot serve: {}",
                self.error().unwrap_or("server is not listening")
            );
        }

        mime::init();

        loop {
            let Some((socket, peer)) = self.accept().await else {
                tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                continue;
            };
            info!("Accepted connection from {}", peer);

            let conn = Connection::new(socket, Arc::clone(&handler))
                .with_default_headers(self.headers.clone());
            tokio::spawn(async move {
                if let Err(e) = conn.run().await {
                    error!("Connection error from {}: {}", peer, e);
                }
            });
        }
    }

    fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(error = %message, "Server lifecycle failure");
        self.error = Some(message);
    }
}

fn bind_socket(addr: SocketAddr) -> io::Result<TcpSocket> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    Ok(socket)
}
