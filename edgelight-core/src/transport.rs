//! Datagram transport to the LED controller.
//!
//! Each transmitted frame is exactly one UDP datagram. There is no
//! acknowledgment, no retry and no fragmentation handling: a realistic
//! strip encodes to well under a kilobyte and 1500 bytes. A failed send is
//! returned to the caller, which decides whether it matters.

use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::net::UdpSocket;

use crate::error::EdgeError;

// ── LedSink ──────────────────────────────────────────────────────

/// Destination for encoded frames.
#[async_trait]
pub trait LedSink: Send {
    /// Send one encoded frame. Returns the number of bytes handed to the
    /// network.
    async fn send_payload(&mut self, payload: &[u8]) -> Result<usize, EdgeError>;

    /// Human-readable destination, for logs.
    fn describe(&self) -> String;
}

// ── UdpLedTransport ──────────────────────────────────────────────

/// Fire-and-forget UDP sender targeting one controller.
pub struct UdpLedTransport {
    socket: UdpSocket,
    remote_addr: SocketAddr,
    datagrams_sent: u64,
    bytes_sent: u64,
}

impl UdpLedTransport {
    /// Resolve `host:port` and bind an ephemeral local socket of the same
    /// address family.
    pub async fn connect(host: &str, port: u16) -> Result<Self, EdgeError> {
        let remote_addr = tokio::net::lookup_host((host, port))
            .await
            .map_err(|e| EdgeError::Resolve(format!("{host}:{port} ({e})")))?
            .next()
            .ok_or_else(|| EdgeError::Resolve(format!("{host}:{port}")))?;

        let local: SocketAddr = if remote_addr.is_ipv4() {
            "0.0.0.0:0".parse().map_err(|_| EdgeError::from("bad bind address"))?
        } else {
            "[::]:0".parse().map_err(|_| EdgeError::from("bad bind address"))?
        };
        let socket = UdpSocket::bind(local).await?;
        Ok(Self::new(socket, remote_addr))
    }

    /// Wrap an already-bound `UdpSocket` targeting `remote_addr`.
    pub fn new(socket: UdpSocket, remote_addr: SocketAddr) -> Self {
        Self {
            socket,
            remote_addr,
            datagrams_sent: 0,
            bytes_sent: 0,
        }
    }

    /// The controller address this transport targets.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Datagrams successfully sent since construction.
    pub fn datagrams_sent(&self) -> u64 {
        self.datagrams_sent
    }

    /// Total payload bytes sent since construction.
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }
}

#[async_trait]
impl LedSink for UdpLedTransport {
    async fn send_payload(&mut self, payload: &[u8]) -> Result<usize, EdgeError> {
        let n = self
            .socket
            .send_to(payload, self.remote_addr)
            .await
            .map_err(EdgeError::Send)?;
        self.datagrams_sent += 1;
        self.bytes_sent += n as u64;
        Ok(n)
    }

    fn describe(&self) -> String {
        self.remote_addr.to_string()
    }
}

// ── Tests ────────────────────────────────────────────────────────
