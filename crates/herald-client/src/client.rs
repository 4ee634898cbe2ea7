//! The notification client facade.

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::manager::ConnectionManager;
use crate::stats::ConnectionStats;
use crate::transport::{Link, Transport, TransportEvent};
use herald_core::{ConnectionState, Envelope, NotificationDraft, NotificationRecord, Topic};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// Live notification client for one session.
///
/// Construct one per authenticated session and call [`shutdown`] (or drop
/// it) when the session ends. All state sits behind one mutex that is
/// never held across an await point. Background work runs on at most two
/// tasks: the session task, which owns the transport's inbound stream,
/// and a pending retry task while a reconnection delay is running.
///
/// Methods that start work (`connect`, `reconnect`) spawn onto the
/// current tokio runtime and return immediately; watch [`status`] to see
/// the outcome.
///
/// [`shutdown`]: NotificationClient::shutdown
/// [`status`]: NotificationClient::status
pub struct NotificationClient<T: Transport> {
    shared: Arc<Shared<T>>,
}

struct Shared<T> {
    transport: T,
    config: ClientConfig,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<ConnectionState>,
    notify_tx: broadcast::Sender<NotificationRecord>,
}

struct Inner {
    manager: ConnectionManager,
    /// Bumped whenever running tasks become stale.
    generation: u64,
    session: Option<JoinHandle<()>>,
    retry: Option<JoinHandle<()>>,
    shut_down: bool,
}

impl Inner {
    fn cancel_tasks(&mut self) {
        self.generation += 1;
        if let Some(session) = self.session.take() {
            session.abort();
        }
        if let Some(retry) = self.retry.take() {
            retry.abort();
        }
    }
}

impl<T: Transport> NotificationClient<T> {
    pub fn new(transport: T, config: ClientConfig) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let (notify_tx, _) = broadcast::channel(config.history_capacity.max(16));
        let inner = Inner {
            manager: ConnectionManager::new(&config),
            generation: 0,
            session: None,
            retry: None,
            shut_down: false,
        };
        Self {
            shared: Arc::new(Shared {
                transport,
                config,
                inner: Mutex::new(inner),
                state_tx,
                notify_tx,
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.shared.config
    }

    /// Start connecting with `token` as the bearer credential.
    ///
    /// Fails only for an empty token or a shut-down client. A connect while
    /// already connected or connecting is ignored. Cancels any pending
    /// reconnection delay.
    pub fn connect(&self, token: impl Into<String>) -> Result<(), ClientError> {
        let token = token.into();
        let mut inner = self.shared.lock();
        if inner.shut_down {
            return Err(ClientError::ShutDown);
        }
        self.shared.spawn_session(&mut inner, token)
    }

    /// Drop the current transport and schedule a new connection attempt
    /// after the configured delay.
    ///
    /// Each call spends one attempt from the reconnection budget and
    /// replaces any retry still waiting on its delay. Once the budget is
    /// spent this returns [`ClientError::MaxAttemptsReached`] until a
    /// connection succeeds.
    pub fn reconnect(&self) -> Result<(), ClientError> {
        let mut inner = self.shared.lock();
        if inner.shut_down {
            return Err(ClientError::ShutDown);
        }
        let token = inner
            .manager
            .token()
            .map(str::to_owned)
            .ok_or(ClientError::AuthMissing)?;
        inner.manager.begin_reconnect()?;
        inner.cancel_tasks();
        self.shared.publish_state(&inner);

        let shared = Arc::clone(&self.shared);
        let generation = inner.generation;
        let delay = self.shared.config.reconnect_delay();
        inner.retry = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            shared.retry(generation, token);
        }));
        Ok(())
    }

    /// Close the connection. Safe to call in any state, any number of times.
    pub fn disconnect(&self) {
        let mut inner = self.shared.lock();
        inner.cancel_tasks();
        inner.manager.disconnect();
        self.shared.publish_state(&inner);
    }

    /// Tear the client down: cancel background tasks, close the transport,
    /// and refuse further connects. Runs once; later calls do nothing.
    pub fn shutdown(&self) {
        let mut inner = self.shared.lock();
        if inner.shut_down {
            return;
        }
        inner.shut_down = true;
        inner.cancel_tasks();
        inner.manager.disconnect();
        self.shared.publish_state(&inner);
        tracing::debug!("notification client shut down");
    }

    pub fn send(&self, envelope: Envelope) -> Result<(), ClientError> {
        self.shared.lock().manager.send(envelope)
    }

    pub fn send_draft(&self, draft: NotificationDraft) -> Result<(), ClientError> {
        self.send(Envelope::NewNotification(draft))
    }

    pub fn subscribe(&self, topic: Topic) -> Result<(), ClientError> {
        self.shared.lock().manager.subscribe(topic)
    }

    pub fn unsubscribe(&self, topic: &Topic) -> Result<(), ClientError> {
        self.shared.lock().manager.unsubscribe(topic)
    }

    /// Empty the history and dismiss the visible error.
    pub fn clear_history(&self) {
        self.shared.lock().manager.clear_history();
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.lock().manager.state()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Receiver that observes every state change.
    pub fn status(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state_tx.subscribe()
    }

    /// Receiver of notifications accepted from now on.
    pub fn notifications(&self) -> broadcast::Receiver<NotificationRecord> {
        self.shared.notify_tx.subscribe()
    }

    pub fn last_error(&self) -> Option<ClientError> {
        self.shared.lock().manager.last_error().cloned()
    }

    /// History, oldest first.
    pub fn history(&self) -> Vec<NotificationRecord> {
        self.shared.lock().manager.history().snapshot()
    }

    pub fn filter_by_kind(&self, kind: &str) -> Vec<NotificationRecord> {
        self.shared.lock().manager.history().filter_by_kind(kind)
    }

    pub fn stats(&self) -> ConnectionStats {
        self.shared.lock().manager.stats()
    }

    /// Topics active on the current transport.
    pub fn subscriptions(&self) -> Vec<Topic> {
        self.shared
            .lock()
            .manager
            .registry()
            .active()
            .cloned()
            .collect()
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.shared.lock().manager.reconnect_attempts()
    }
}

impl<T: Transport> Drop for NotificationClient<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<T: Transport> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_state(&self, inner: &Inner) {
        let next = inner.manager.state();
        self.state_tx.send_if_modified(|state| {
            let changed = *state != next;
            *state = next;
            changed
        });
    }

    fn spawn_session(
        self: &Arc<Self>,
        inner: &mut Inner,
        token: String,
    ) -> Result<(), ClientError> {
        if !inner.manager.begin_connect(&token)? {
            return Ok(());
        }
        inner.cancel_tasks();
        self.publish_state(inner);

        let shared = Arc::clone(self);
        let generation = inner.generation;
        inner.session = Some(tokio::spawn(async move {
            shared.run_session(generation, token).await;
        }));
        Ok(())
    }

    /// Fired by the retry task once the delay has elapsed.
    fn retry(self: &Arc<Self>, generation: u64, token: String) {
        let mut inner = self.lock();
        if inner.generation != generation || inner.shut_down {
            return;
        }
        // This task is the one finishing; detach rather than abort it.
        inner.retry = None;
        if let Err(e) = self.spawn_session(&mut inner, token) {
            tracing::warn!("scheduled reconnect failed: {}", e);
        }
    }

    async fn run_session(self: Arc<Self>, generation: u64, token: String) {
        let opened = self.transport.open(&token).await;

        let mut inbound = {
            let mut inner = self.lock();
            if inner.generation != generation {
                return;
            }
            match opened {
                Ok(Link { outbound, inbound }) => {
                    inner.manager.on_open(outbound);
                    self.publish_state(&inner);
                    inbound
                }
                Err(e) => {
                    inner.manager.on_handshake_failed(e.to_string());
                    self.publish_state(&inner);
                    return;
                }
            }
        };

        while let Some(event) = inbound.recv().await {
            let mut inner = self.lock();
            if inner.generation != generation {
                return;
            }
            match event {
                TransportEvent::Frame(raw) => {
                    if let Some(record) = inner.manager.on_frame(&raw) {
                        // No receivers is fine; history still has it.
                        let _ = self.notify_tx.send(record);
                    }
                }
                TransportEvent::Closed => inner.manager.on_close(),
                TransportEvent::Failed(reason) => inner.manager.on_error(reason),
            }
            self.publish_state(&inner);
            if inner.manager.state() != ConnectionState::Connected {
                return;
            }
        }

        let mut inner = self.lock();
        if inner.generation == generation {
            inner.manager.on_close();
            self.publish_state(&inner);
        }
    }
}
