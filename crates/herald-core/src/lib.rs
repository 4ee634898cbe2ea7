//! Core types for Herald.
//!
//! This crate provides the protocol primitives: topics, notification
//! payloads, the envelope that wraps them on the wire, and the codec that
//! turns raw frames into envelopes. The connection logic lives in
//! `herald-client`.

pub mod codec;
mod message;
mod record;
mod topic;

pub use codec::DecodeError;
pub use message::{ClientFrame, Envelope};
pub use record::{EntityRef, NotificationDraft, NotificationRecord, ProtocolFault};
pub use topic::{Topic, TopicParseError};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No transport. Initial state.
    #[default]
    Disconnected,
    /// Handshake in flight.
    Connecting,
    /// Handshake done, frames flowing.
    Connected,
    /// Handshake rejected or the server reported a failure.
    Errored,
}

impl ConnectionState {
    /// Whether a new connection attempt may start from this state.
    pub fn can_connect(self) -> bool {
        matches!(self, ConnectionState::Disconnected | ConnectionState::Errored)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Errored => "errored",
        };
        f.write_str(name)
    }
}
