// TCP connection handler
// Wraps one producer connection accepted by the listener

use std::io;
use std::net::SocketAddr;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

use crate::constants::READ_CHUNK_SIZE;

/// Represents a single TCP connection from a telemetry producer
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    peer_addr: SocketAddr,
    buf: Box<[u8]>,
}

impl Connection {
    /// Create a new connection from a TCP stream
    pub fn new(stream: TcpStream, peer_addr: SocketAddr) -> Self {
        Connection {
            stream,
            peer_addr,
            buf: vec![0u8; READ_CHUNK_SIZE].into_boxed_slice(),
        }
    }

    /// Get the peer address
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Wait for the next chunk of bytes. An empty slice means the peer
    /// closed the stream.
    pub async fn read_chunk(&mut self) -> io::Result<&[u8]> {
        let n = self.stream.read(&mut self.buf).await?;
        Ok(&self.buf[..n])
    }
}
