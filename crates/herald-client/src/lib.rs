//! Live notification client for Herald.
//!
//! [`NotificationClient`] keeps one authenticated connection to the
//! notification endpoint, stores the most recent notifications in a
//! bounded history, and reconnects on request within a fixed attempt
//! budget.
//!
//! ```no_run
//! use herald_client::{ClientConfig, NotificationClient, WsTransport};
//!
//! # async fn run() -> Result<(), herald_client::ClientError> {
//! let config = ClientConfig::new("wss://admin.example.com/ws");
//! let transport = WsTransport::new(&config.url, config.handshake_timeout());
//! let client = NotificationClient::new(transport, config);
//!
//! client.connect("session-token")?;
//! let mut incoming = client.notifications();
//! while let Ok(record) = incoming.recv().await {
//!     println!("{}", record.content);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
pub mod config;
mod error;
pub mod history;
pub mod manager;
pub mod reconnect;
pub mod registry;
pub mod rest;
pub mod stats;
pub mod transport;

pub use client::NotificationClient;
pub use config::{ClientConfig, OfflineSendPolicy};
pub use error::{ClientError, ConfigError};
pub use stats::ConnectionStats;
pub use transport::{MemoryTransport, Transport, TransportError, WsTransport};

pub use herald_core::{ConnectionState, Envelope, NotificationDraft, NotificationRecord, Topic};
