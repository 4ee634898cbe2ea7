//! The client against a real local WebSocket server.

use futures_util::{SinkExt, Stream, StreamExt};
use herald_client::{
    ClientConfig, ClientError, ConnectionState, NotificationClient, NotificationDraft,
    WsTransport,
};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;

const WAIT: Duration = Duration::from_secs(5);

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/ws", listener.local_addr().unwrap());
    (listener, url)
}

fn client_for(url: &str) -> NotificationClient<WsTransport> {
    let config = ClientConfig::new(url);
    let transport = WsTransport::new(url, config.handshake_timeout());
    NotificationClient::new(transport, config)
}

async fn wait_for(client: &NotificationClient<WsTransport>, state: ConnectionState) {
    let mut status = client.status();
    timeout(WAIT, status.wait_for(|s| *s == state))
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {state}"))
        .expect("status channel closed");
}

async fn next_text<S>(stream: &mut S) -> serde_json::Value
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => return serde_json::from_str(text.as_str()).unwrap(),
            Some(Ok(_)) => continue,
            other => panic!("expected a text frame, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn notifications_flow_over_websocket() {
    let (listener, url) = bind().await;

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut auth = None;
        let ws = tokio_tungstenite::accept_hdr_async(
            stream,
            |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                auth = req
                    .headers()
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);
                Ok(resp)
            },
        )
        .await
        .unwrap();
        let (mut sink, mut stream) = ws.split();

        let subscribe = next_text(&mut stream).await;
        let push = r#"{"type":"NOTIFICATION","content":{"id":1,"content":"Task assigned","userId":5}}"#;
        sink.send(Message::Text(push.to_string().into()))
            .await
            .unwrap();
        let sent = next_text(&mut stream).await;
        sink.send(Message::Close(None)).await.unwrap();

        (auth, subscribe, sent)
    });

    let client = client_for(&url);
    let mut incoming = client.notifications();
    client.connect("tok-1").unwrap();

    let record = timeout(WAIT, incoming.recv()).await.unwrap().unwrap();
    assert_eq!(record.id, 1);
    assert_eq!(record.content, "Task assigned");
    assert_eq!(client.stats().received, 1);

    client.send_draft(NotificationDraft::new("seen", 5)).unwrap();

    let (auth, subscribe, sent) = timeout(WAIT, server).await.unwrap().unwrap();
    assert_eq!(auth.as_deref(), Some("Bearer tok-1"));
    assert_eq!(subscribe["command"], "SUBSCRIBE");
    assert_eq!(subscribe["destination"], "/topic/notifications");
    assert_eq!(sent["command"], "SEND");
    assert_eq!(sent["body"]["content"]["content"], "seen");

    wait_for(&client, ConnectionState::Disconnected).await;
    assert!(client.subscriptions().is_empty());
    assert_eq!(client.history().len(), 1);
}

#[tokio::test]
async fn rejected_upgrade_errors_the_client() {
    let (listener, url) = bind().await;

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let _ = tokio_tungstenite::accept_hdr_async(
            stream,
            |_: &Request, _: Response| -> Result<Response, ErrorResponse> {
                let mut denied = ErrorResponse::new(Some("bad token".into()));
                *denied.status_mut() = StatusCode::UNAUTHORIZED;
                Err(denied)
            },
        )
        .await;
    });

    let client = client_for(&url);
    client.connect("expired").unwrap();
    wait_for(&client, ConnectionState::Errored).await;
    assert!(matches!(
        client.last_error(),
        Some(ClientError::HandshakeFailed(reason)) if reason.contains("401")
    ));
}

#[tokio::test]
async fn unreachable_endpoint_errors_the_client() {
    let (listener, url) = bind().await;
    drop(listener);

    let client = client_for(&url);
    client.connect("tok-1").unwrap();
    wait_for(&client, ConnectionState::Errored).await;
    assert!(matches!(
        client.last_error(),
        Some(ClientError::HandshakeFailed(_))
    ));
}

#[tokio::test]
async fn disconnect_releases_socket_without_close_reply() {
    let (listener, url) = bind().await;

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        // Read raw bytes under the websocket layer so the close frame is
        // never answered. EOF means the client let go of the socket.
        let socket = ws.get_mut();
        let mut buf = [0u8; 1024];
        loop {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(_) => {}
            }
        }
    });

    let client = client_for(&url);
    client.connect("tok-1").unwrap();
    wait_for(&client, ConnectionState::Connected).await;

    client.disconnect();
    timeout(WAIT, server)
        .await
        .expect("client kept the socket open")
        .unwrap();
}
