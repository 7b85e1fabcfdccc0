// TCP listener and server
// Accepts producer connections and hands them to a dispatcher

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{debug, warn};

use super::connection::Connection;
use super::dispatch::Dispatcher;

/// TCP server that accepts producer connections
pub struct TcpServer {
    addr: SocketAddr,
}

impl TcpServer {
    /// Bind `addr` and start the accept loop.
    ///
    /// Binding is the only step that can fail; once listening, accept errors
    /// are logged and the loop keeps going for the life of the process.
    pub async fn start(addr: SocketAddr, dispatcher: Arc<dyn Dispatcher>) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, peer_addr)) => {
                        debug!(%peer_addr, "Accepted connection");
                        dispatcher.submit(Connection::new(stream, peer_addr));
                    }
                    Err(e) => warn!("Accept error: {}", e),
                }
            }
        });

        Ok(TcpServer { addr: local_addr })
    }

    /// Get the address the server is listening on
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}
