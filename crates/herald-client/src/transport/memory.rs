//! In-process transport backed by channels.
//!
//! Each successful `open` produces a [`MemoryPeer`] on the paired
//! [`MemoryServer`], which plays the remote side: it sees the token and
//! every outbound frame, and can push frames, close, or fail the link.

use super::{Link, Transport, TransportError, TransportEvent};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;

#[derive(Debug, Default)]
struct Gate {
    refuse: Option<String>,
    opens: usize,
}

/// Client half. Cheap to clone; clones share the same server.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    gate: Arc<Mutex<Gate>>,
    peers: mpsc::UnboundedSender<MemoryPeer>,
}

/// Server half. Yields one [`MemoryPeer`] per accepted connection.
#[derive(Debug)]
pub struct MemoryServer {
    peers: mpsc::UnboundedReceiver<MemoryPeer>,
}

/// The remote end of one accepted connection.
#[derive(Debug)]
pub struct MemoryPeer {
    pub token: String,
    events: mpsc::UnboundedSender<TransportEvent>,
    frames: mpsc::UnboundedReceiver<String>,
}

impl MemoryTransport {
    pub fn pair() -> (MemoryTransport, MemoryServer) {
        let (peers_tx, peers_rx) = mpsc::unbounded_channel();
        let transport = MemoryTransport {
            gate: Arc::default(),
            peers: peers_tx,
        };
        (transport, MemoryServer { peers: peers_rx })
    }

    /// Refuse every handshake from now on with `reason`.
    pub fn refuse(&self, reason: impl Into<String>) {
        self.gate().refuse = Some(reason.into());
    }

    /// Accept handshakes again.
    pub fn accept(&self) {
        self.gate().refuse = None;
    }

    /// Number of handshakes attempted, accepted or not.
    pub fn opens(&self) -> usize {
        self.gate().opens
    }

    fn gate(&self) -> std::sync::MutexGuard<'_, Gate> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for MemoryTransport {
    async fn open(&self, token: &str) -> Result<Link, TransportError> {
        {
            let mut gate = self.gate();
            gate.opens += 1;
            if let Some(reason) = &gate.refuse {
                return Err(TransportError::Refused(reason.clone()));
            }
        }

        let (outbound, frames) = mpsc::unbounded_channel();
        let (events, inbound) = mpsc::unbounded_channel();
        let peer = MemoryPeer {
            token: token.to_owned(),
            events,
            frames,
        };
        self.peers
            .send(peer)
            .map_err(|_| TransportError::Refused("server is gone".into()))?;

        Ok(Link { outbound, inbound })
    }
}

impl MemoryServer {
    /// Wait for the next accepted connection.
    pub async fn accept(&mut self) -> Option<MemoryPeer> {
        self.peers.recv().await
    }
}

impl MemoryPeer {
    /// Deliver a raw text frame to the client.
    pub fn push(&self, raw: impl Into<String>) {
        let _ = self.events.send(TransportEvent::Frame(raw.into()));
    }

    /// Close the connection from the server side.
    pub fn close(&self) {
        let _ = self.events.send(TransportEvent::Closed);
    }

    /// Break the connection.
    pub fn fail(&self, reason: impl Into<String>) {
        let _ = self.events.send(TransportEvent::Failed(reason.into()));
    }

    /// Next frame written by the client, or `None` once the client has
    /// dropped its end.
    pub async fn recv(&mut self) -> Option<String> {
        self.frames.recv().await
    }

    /// Frames already written by the client, without waiting.
    pub fn drain(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(frame) = self.frames.try_recv() {
            out.push(frame);
        }
        out
    }
}
