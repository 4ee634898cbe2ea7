//! Client error types.

use herald_core::ConnectionState;

/// Failures surfaced by the notification client.
///
/// Values are cheap to clone so the most recent one can be kept as the
/// client's visible error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("no auth token available; sign in before connecting")]
    AuthMissing,
    #[error("handshake failed: {0}")]
    HandshakeFailed(String),
    #[error("protocol error: {0}")]
    ProtocolError(String),
    #[error("not connected")]
    NotConnected,
    #[error("cannot send while {0}")]
    NotSendable(ConnectionState),
    #[error("outbox full ({0} envelopes waiting)")]
    OutboxFull(usize),
    #[error("gave up after {0} reconnection attempts; reconnect manually or reload the page")]
    MaxAttemptsReached(u32),
    #[error("failed to encode frame: {0}")]
    Encode(String),
    #[error("client has been shut down")]
    ShutDown,
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Encode(err.to_string())
    }
}

/// Failures loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
