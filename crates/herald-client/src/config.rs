//! Client configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config.
//!
//! ```toml
//! url = "wss://admin.example.com/ws"
//! history_capacity = 100
//! max_reconnect_attempts = 5
//! offline_send = "queue"
//! ```

use crate::error::ConfigError;
use crate::{history, reconnect};
use herald_core::Topic;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// What `send` does while the connection is down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfflineSendPolicy {
    /// Report `NotSendable` to the caller.
    #[default]
    Reject,
    /// Hold envelopes and flush them after the next successful connect.
    Queue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// WebSocket endpoint.
    pub url: String,
    /// Topic subscribed automatically on every successful connect.
    pub default_topic: Topic,
    /// Destination outbound envelopes are published to.
    pub send_destination: Topic,
    pub history_capacity: usize,
    pub max_reconnect_attempts: u32,
    pub reconnect_delay_ms: u64,
    pub handshake_timeout_ms: u64,
    /// Re-subscribe every caller-requested topic after reconnecting, not
    /// just the default one.
    pub resubscribe_all: bool,
    pub offline_send: OfflineSendPolicy,
    pub outbox_capacity: usize,
    /// Base URL of the notifications REST API.
    pub rest_base_url: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8080/ws".to_string(),
            default_topic: Topic::default_topic(),
            send_destination: Topic::send_destination(),
            history_capacity: history::DEFAULT_CAPACITY,
            max_reconnect_attempts: reconnect::DEFAULT_MAX_ATTEMPTS,
            reconnect_delay_ms: reconnect::DEFAULT_DELAY.as_millis() as u64,
            handshake_timeout_ms: 10_000,
            resubscribe_all: false,
            offline_send: OfflineSendPolicy::Reject,
            outbox_capacity: 32,
            rest_base_url: None,
        }
    }
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::Invalid("url cannot be empty".into()));
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid(
                "history_capacity must be at least 1".into(),
            ));
        }
        if self.offline_send == OfflineSendPolicy::Queue && self.outbox_capacity == 0 {
            return Err(ConfigError::Invalid(
                "outbox_capacity must be at least 1 when offline_send = \"queue\"".into(),
            ));
        }
        Ok(())
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }
}
