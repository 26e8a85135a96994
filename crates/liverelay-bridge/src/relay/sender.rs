use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

use liverelay_core::error::{RelayError, Result};
use liverelay_core::protocol::frame::{encode_frame, RelayPayload};

/// Opens connections to the downstream consumer.
#[async_trait]
pub trait Connector: Send + Sync {
    type Conn: AsyncWrite + Unpin + Send;

    async fn connect(&self) -> io::Result<Self::Conn>;

    /// Target description for logs.
    fn target(&self) -> String;
}

/// TCP connector for a fixed address.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    addr: SocketAddr,
}

impl TcpConnector {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Conn = TcpStream;

    async fn connect(&self) -> io::Result<TcpStream> {
        let stream = TcpStream::connect(self.addr).await?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }

    fn target(&self) -> String {
        self.addr.to_string()
    }
}

/// Connection state as seen between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    Absent,
    Open,
}

/// Lazily connected, self-healing frame writer.
///
/// - First send (or first send after a failure) connects, bounded by
///   `connect_timeout`. A failed connect fails only that send.
/// - A failed write drops the connection; the next send reconnects.
///
/// Takes `&mut self`, so one owner drives it and establishment never races.
pub struct RelaySender<C: Connector> {
    connector: C,
    connect_timeout: Duration,
    max_frame_bytes: usize,
    conn: Option<C::Conn>,
}

impl<C: Connector> RelaySender<C> {
    pub fn new(connector: C, connect_timeout: Duration, max_frame_bytes: usize) -> Self {
        Self {
            connector,
            connect_timeout,
            max_frame_bytes,
            conn: None,
        }
    }

    pub fn state(&self) -> ConnState {
        if self.conn.is_some() {
            ConnState::Open
        } else {
            ConnState::Absent
        }
    }

    /// Frame `payload` and write it, header and body together, then flush.
    pub async fn send(&mut self, payload: &RelayPayload) -> Result<()> {
        // Oversized payloads fail before touching the connection.
        let frame = encode_frame(payload, self.max_frame_bytes)?;

        let conn = self.ensure_connected().await?;
        let written = async {
            conn.write_all(&frame).await?;
            conn.flush().await
        }
        .await;

        if let Err(e) = written {
            self.conn = None;
            info!(target_addr = %self.connector.target(), error = %e, "relay connection dropped");
            return Err(RelayError::RelayWrite(e.to_string()));
        }

        debug!(bytes = frame.len(), "relay frame written");
        Ok(())
    }

    async fn ensure_connected(&mut self) -> Result<&mut C::Conn> {
        if self.conn.is_none() {
            let target = self.connector.target();
            let conn = match timeout(self.connect_timeout, self.connector.connect()).await {
                Ok(Ok(c)) => c,
                Ok(Err(e)) => return Err(RelayError::RelayConnect(format!("{target}: {e}"))),
                Err(_) => {
                    return Err(RelayError::RelayConnect(format!(
                        "{target}: timed out after {}ms",
                        self.connect_timeout.as_millis()
                    )))
                }
            };
            info!(target_addr = %target, "relay connection established");
            self.conn = Some(conn);
        }

        self.conn
            .as_mut()
            .ok_or_else(|| RelayError::Internal("relay connection missing after connect".into()))
    }
}
