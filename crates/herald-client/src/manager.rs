//! Connection state machine.
//!
//! [`ConnectionManager`] owns the connection state, history, subscriptions,
//! counters, and the outbound half of the live transport. It performs no
//! I/O of its own: the facade feeds it transport events through the
//! `on_*` entry points and writes go out through the outbound channel.
//!
//! ```text
//! Disconnected --begin_connect--> Connecting --on_open--> Connected
//!                                 Connecting --on_handshake_failed--> Errored
//!                                 Connected  --on_close--> Disconnected
//!                                 Connected  --on_error--> Errored
//! Errored / Disconnected --begin_connect--> Connecting
//! any --disconnect / begin_reconnect--> Disconnected
//! ```

use crate::config::{ClientConfig, OfflineSendPolicy};
use crate::error::ClientError;
use crate::history::HistoryBuffer;
use crate::reconnect::ReconnectCounter;
use crate::registry::SubscriptionRegistry;
use crate::stats::{ConnectionStats, StatsTracker};
use herald_core::{ClientFrame, ConnectionState, Envelope, NotificationRecord, Topic, codec};
use std::collections::VecDeque;
use tokio::sync::mpsc;

#[derive(Debug)]
pub struct ConnectionManager {
    state: ConnectionState,
    last_error: Option<ClientError>,
    token: Option<String>,
    reconnect: ReconnectCounter,
    registry: SubscriptionRegistry,
    history: HistoryBuffer,
    stats: StatsTracker,
    outbound: Option<mpsc::UnboundedSender<String>>,
    outbox: VecDeque<Envelope>,
    default_topic: Topic,
    send_destination: Topic,
    resubscribe_all: bool,
    offline_send: OfflineSendPolicy,
    outbox_capacity: usize,
}

impl ConnectionManager {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            last_error: None,
            token: None,
            reconnect: ReconnectCounter::new(config.max_reconnect_attempts),
            registry: SubscriptionRegistry::new(),
            history: HistoryBuffer::new(config.history_capacity),
            stats: StatsTracker::new(),
            outbound: None,
            outbox: VecDeque::new(),
            default_topic: config.default_topic.clone(),
            send_destination: config.send_destination.clone(),
            resubscribe_all: config.resubscribe_all,
            offline_send: config.offline_send,
            outbox_capacity: config.outbox_capacity,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }

    /// The token of the most recent connect.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect.attempts()
    }

    pub fn outbox_len(&self) -> usize {
        self.outbox.len()
    }

    pub fn stats(&self) -> ConnectionStats {
        self.stats.snapshot(self.history.len())
    }

    /// Validate the token and enter `Connecting`.
    ///
    /// Returns `Ok(false)` when a connection is already up or in flight;
    /// the caller should not open a transport in that case.
    pub fn begin_connect(&mut self, token: &str) -> Result<bool, ClientError> {
        if token.trim().is_empty() {
            return Err(ClientError::AuthMissing);
        }
        if !self.state.can_connect() {
            tracing::debug!(state = ?self.state, "connect ignored");
            return Ok(false);
        }

        self.token = Some(token.to_owned());
        self.transition(ConnectionState::Connecting);
        Ok(true)
    }

    /// Handshake succeeded.
    ///
    /// Only the default topic is subscribed here. Topics the caller added
    /// on a previous connection come back only with `resubscribe_all`.
    pub fn on_open(&mut self, outbound: mpsc::UnboundedSender<String>) {
        if self.state != ConnectionState::Connecting {
            tracing::debug!(state = ?self.state, "dropping late handshake");
            return;
        }

        self.outbound = Some(outbound);
        self.reconnect.reset();
        self.last_error = None;
        self.transition(ConnectionState::Connected);

        let mut topics = vec![self.default_topic.clone()];
        if self.resubscribe_all {
            topics.extend(self.registry.requested().cloned());
        }
        for topic in topics {
            if let Err(e) = self.activate(topic) {
                tracing::warn!("subscribe on connect failed: {}", e);
            }
        }

        while let Some(envelope) = self.outbox.pop_front() {
            if let Err(e) = self.publish(envelope) {
                tracing::warn!("dropping queued envelope: {}", e);
            }
        }
    }

    pub fn on_handshake_failed(&mut self, reason: impl Into<String>) {
        if self.state != ConnectionState::Connecting {
            return;
        }
        let reason = reason.into();
        tracing::warn!(%reason, "handshake failed");
        self.last_error = Some(ClientError::HandshakeFailed(reason));
        self.transition(ConnectionState::Errored);
    }

    /// One inbound frame. Returns the record when a notification was
    /// accepted into history. Never fails: anything unusable is logged and
    /// dropped.
    pub fn on_frame(&mut self, raw: &str) -> Option<NotificationRecord> {
        if self.state != ConnectionState::Connected {
            tracing::debug!(state = ?self.state, "frame after disconnect dropped");
            return None;
        }

        match codec::decode(raw) {
            Ok(Envelope::Notification(record)) => {
                self.history.append(record.clone());
                self.stats.record_received();
                Some(record)
            }
            Ok(Envelope::Error(fault)) => {
                self.on_error(fault.message);
                None
            }
            Ok(other) => {
                tracing::debug!(kind = other.kind(), "ignoring frame");
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "dropping malformed frame");
                None
            }
        }
    }

    /// The remote side closed the transport.
    pub fn on_close(&mut self) {
        if matches!(
            self.state,
            ConnectionState::Connected | ConnectionState::Connecting
        ) {
            tracing::info!("transport closed");
            self.teardown();
            self.transition(ConnectionState::Disconnected);
        }
    }

    /// Protocol-level failure on a live connection.
    pub fn on_error(&mut self, reason: impl Into<String>) {
        if self.state == ConnectionState::Disconnected {
            return;
        }
        let reason = reason.into();
        tracing::warn!(%reason, "protocol error");
        self.last_error = Some(ClientError::ProtocolError(reason));
        self.teardown();
        self.transition(ConnectionState::Errored);
    }

    /// Spend one reconnection attempt and drop the current transport.
    ///
    /// Returns the attempt number. Once the budget is spent the error is
    /// recorded as the visible error and returned; nothing is torn down.
    pub fn begin_reconnect(&mut self) -> Result<u32, ClientError> {
        if self.token.is_none() {
            return Err(ClientError::AuthMissing);
        }
        let Some(attempt) = self.reconnect.try_next() else {
            let err = ClientError::MaxAttemptsReached(self.reconnect.max_attempts());
            tracing::warn!("{}", err);
            self.last_error = Some(err.clone());
            return Err(err);
        };

        tracing::info!(
            attempt,
            max = self.reconnect.max_attempts(),
            "reconnecting"
        );
        self.teardown();
        self.transition(ConnectionState::Disconnected);
        Ok(attempt)
    }

    pub fn disconnect(&mut self) {
        self.teardown();
        self.transition(ConnectionState::Disconnected);
    }

    /// Publish an envelope to the send destination.
    pub fn send(&mut self, envelope: Envelope) -> Result<(), ClientError> {
        if self.state == ConnectionState::Connected {
            return self.publish(envelope);
        }

        match self.offline_send {
            OfflineSendPolicy::Reject => Err(ClientError::NotSendable(self.state)),
            OfflineSendPolicy::Queue if self.outbox.len() >= self.outbox_capacity => {
                Err(ClientError::OutboxFull(self.outbox.len()))
            }
            OfflineSendPolicy::Queue => {
                tracing::debug!(queued = self.outbox.len() + 1, "queued envelope");
                self.outbox.push_back(envelope);
                Ok(())
            }
        }
    }

    pub fn subscribe(&mut self, topic: Topic) -> Result<(), ClientError> {
        if self.state != ConnectionState::Connected {
            return Err(ClientError::NotConnected);
        }
        self.registry.request(topic.clone());
        self.activate(topic)
    }

    /// No-op when the topic is not active or the connection is down.
    pub fn unsubscribe(&mut self, topic: &Topic) -> Result<(), ClientError> {
        self.registry.forget(topic);
        if self.state != ConnectionState::Connected || !self.registry.deactivate(topic) {
            return Ok(());
        }
        tracing::debug!(%topic, "unsubscribing");
        self.write(&ClientFrame::Unsubscribe {
            destination: topic.clone(),
        })
    }

    /// Empty history and dismiss the visible error.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.last_error = None;
    }

    fn activate(&mut self, topic: Topic) -> Result<(), ClientError> {
        if !self.registry.activate(topic.clone()) {
            return Ok(());
        }
        tracing::debug!(%topic, "subscribing");
        let frame = ClientFrame::Subscribe {
            destination: topic.clone(),
        };
        self.write(&frame).inspect_err(|_| {
            self.registry.deactivate(&topic);
        })
    }

    fn publish(&mut self, envelope: Envelope) -> Result<(), ClientError> {
        self.write(&ClientFrame::Send {
            destination: self.send_destination.clone(),
            body: envelope,
        })?;
        self.stats.record_sent();
        Ok(())
    }

    fn write(&self, frame: &ClientFrame) -> Result<(), ClientError> {
        let text = codec::encode(frame)?;
        let outbound = self.outbound.as_ref().ok_or(ClientError::NotConnected)?;
        outbound.send(text).map_err(|_| ClientError::NotConnected)
    }

    fn teardown(&mut self) {
        self.outbound = None;
        self.registry.clear_active();
    }

    fn transition(&mut self, next: ConnectionState) {
        if self.state != next {
            tracing::info!(from = %self.state, to = %next, "connection state");
            self.state = next;
        }
    }
}
