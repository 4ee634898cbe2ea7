//! WebSocket transport.

use super::{Link, Transport, TransportError, TransportEvent};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderValue, header::AUTHORIZATION};
use tokio_tungstenite::tungstenite::{self, Message};

/// Connects to a `ws://` or `wss://` endpoint with `tokio-tungstenite`.
///
/// The token goes out as `Authorization: Bearer <token>` on the upgrade
/// request. Each open connection runs two pump tasks: one drains the
/// outbound channel into the socket, the other forwards text frames into
/// the inbound channel.
#[derive(Debug, Clone)]
pub struct WsTransport {
    url: String,
    handshake_timeout: Duration,
}

impl WsTransport {
    pub fn new(url: impl Into<String>, handshake_timeout: Duration) -> Self {
        Self {
            url: url.into(),
            handshake_timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for WsTransport {
    async fn open(&self, token: &str) -> Result<Link, TransportError> {
        let mut request = self.url.as_str().into_client_request()?;
        let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| TransportError::InvalidToken)?;
        request.headers_mut().insert(AUTHORIZATION, bearer);

        tracing::debug!(url = %self.url, "opening websocket");
        let connect = tokio_tungstenite::connect_async(request);
        let ws = match tokio::time::timeout(self.handshake_timeout, connect).await {
            Ok(Ok((ws, _response))) => ws,
            Ok(Err(tungstenite::Error::Http(response))) => {
                return Err(TransportError::Rejected(response.status().as_u16()));
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(TransportError::Timeout(self.handshake_timeout)),
        };

        let (mut sink, mut stream) = ws.split();
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<String>();
        let (inbound_tx, inbound) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(text) = outbound_rx.recv().await {
                if let Err(e) = sink.send(Message::Text(text.into())).await {
                    tracing::debug!("websocket write failed: {}", e);
                    return;
                }
            }
            // Sender dropped: the owner is done with this connection.
            let _ = sink.close().await;
        });

        tokio::spawn(async move {
            loop {
                // Stop as soon as the session drops its receiver, even if the
                // server never answers the close handshake.
                let msg = tokio::select! {
                    msg = stream.next() => msg,
                    _ = inbound_tx.closed() => return,
                };
                let Some(msg) = msg else { break };
                let event = match msg {
                    Ok(Message::Text(text)) => TransportEvent::Frame(text.as_str().to_owned()),
                    Ok(Message::Close(_)) => break,
                    Ok(_) => continue,
                    Err(e) => {
                        let _ = inbound_tx.send(TransportEvent::Failed(e.to_string()));
                        return;
                    }
                };
                if inbound_tx.send(event).is_err() {
                    return;
                }
            }
            let _ = inbound_tx.send(TransportEvent::Closed);
        });

        Ok(Link { outbound, inbound })
    }
}
