//! Transport seam.
//!
//! A [`Transport`] opens one authenticated connection and hands back a
//! [`Link`]: a sender for outbound text frames and a receiver of
//! [`TransportEvent`]s. Dropping the link's outbound sender closes the
//! connection.

mod memory;
mod ws;

pub use memory::{MemoryPeer, MemoryServer, MemoryTransport};
pub use ws::WsTransport;

use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite;

/// Something that happened on an open connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// One inbound text frame.
    Frame(String),
    /// The remote side closed the connection.
    Closed,
    /// The connection broke.
    Failed(String),
}

/// Both directions of an open connection.
#[derive(Debug)]
pub struct Link {
    pub outbound: mpsc::UnboundedSender<String>,
    pub inbound: mpsc::UnboundedReceiver<TransportEvent>,
}

/// Opens connections to the notification endpoint.
pub trait Transport: Send + Sync + 'static {
    /// Perform the handshake, presenting `token` as a bearer credential.
    fn open(&self, token: &str) -> impl Future<Output = Result<Link, TransportError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("token is not a valid header value")]
    InvalidToken,
    #[error("handshake timed out after {0:?}")]
    Timeout(Duration),
    #[error("server rejected handshake with HTTP {0}")]
    Rejected(u16),
    #[error("connection refused: {0}")]
    Refused(String),
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
}
