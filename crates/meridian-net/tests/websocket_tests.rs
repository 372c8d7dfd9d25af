//! WebSocket session tests against loopback servers.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::time::timeout;

use meridian_net::{NetworkError, WebSocketConfig, WebSocketSession, WebSocketState, WsMessage};

const WAIT: Duration = Duration::from_secs(5);

/// Bind a loopback listener and return its ws:// URL.
async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    (listener, url)
}

/// Accept connections forever and echo text/binary frames back.
fn spawn_echo_server(listener: TcpListener) {
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
                while let Some(Ok(frame)) = ws.next().await {
                    if frame.is_text() || frame.is_binary() {
                        if ws.send(frame).await.is_err() {
                            break;
                        }
                    }
                }
            });
        }
    });
}

fn fast_config(url: String) -> WebSocketConfig {
    WebSocketConfig::new(url)
        .ping_interval(Duration::from_secs(60))
        .reconnect_delay(Duration::from_millis(20))
}

#[test]
fn test_config_builder() {
    let config = WebSocketConfig::new("wss://stream.example.com/live")
        .ping_interval(Duration::from_secs(10))
        .timeout(Duration::from_secs(5))
        .reconnect_attempts(3)
        .reconnect_delay(Duration::from_millis(500))
        .header("Authorization", "Bearer token");

    assert_eq!(config.url, "wss://stream.example.com/live");
    assert_eq!(config.ping_interval, Duration::from_secs(10));
    assert_eq!(config.timeout, Duration::from_secs(5));
    assert_eq!(config.reconnect_attempts, 3);
    assert_eq!(config.reconnect_delay, Duration::from_millis(500));
    assert_eq!(
        config.headers.get("Authorization"),
        Some(&"Bearer token".to_string())
    );
}

#[test]
fn test_config_defaults() {
    let config = WebSocketConfig::new("ws://localhost:9000");
    assert_eq!(config.ping_interval, Duration::from_secs(20));
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.reconnect_attempts, 5);
    assert_eq!(config.reconnect_delay, Duration::from_secs(5));

    assert_eq!(config.no_reconnect().reconnect_attempts, 0);
}

#[tokio::test]
async fn test_initial_state() {
    let session = WebSocketSession::new(WebSocketConfig::new("ws://localhost:9000"));
    assert_eq!(session.state(), WebSocketState::Disconnected);
    assert!(!session.is_connected());
    assert_eq!(session.url(), "ws://localhost:9000");
}

#[tokio::test]
async fn test_send_before_connect_fails() {
    let session = WebSocketSession::new(WebSocketConfig::new("ws://localhost:9000"));
    assert_eq!(
        session.send_text("hello").await,
        Err(NetworkError::NetworkUnavailable)
    );
}

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    let session = WebSocketSession::new(WebSocketConfig::new("ws://localhost:9000"));
    session.disconnect().await;
    session.disconnect().await;
    assert_eq!(session.state(), WebSocketState::Disconnected);
}

#[tokio::test]
async fn test_connect_failure_moves_to_error_state() {
    // Bind then drop so the port is known to refuse connections.
    let (listener, url) = bind().await;
    drop(listener);

    let session = WebSocketSession::new(fast_config(url).no_reconnect());
    assert!(session.connect().await.is_err());
    assert_eq!(session.state(), WebSocketState::Error);
}

#[tokio::test]
async fn test_connect_and_echo() {
    let (listener, url) = bind().await;
    spawn_echo_server(listener);

    let session = WebSocketSession::new(fast_config(url).no_reconnect());
    let mut states = session.subscribe_state();
    let mut texts = session.subscribe_text();
    let mut messages = session.subscribe_messages();

    session.connect().await.unwrap();
    timeout(WAIT, states.wait_for(|s| *s == WebSocketState::Connected))
        .await
        .unwrap()
        .unwrap();
    assert!(session.is_connected());

    session.send_text("hello there").await.unwrap();
    assert_eq!(timeout(WAIT, texts.recv()).await.unwrap().unwrap(), "hello there");
    assert_eq!(
        timeout(WAIT, messages.recv()).await.unwrap().unwrap(),
        WsMessage::Text("hello there".into())
    );

    session.disconnect().await;
    assert_eq!(session.state(), WebSocketState::Disconnected);
}

#[tokio::test]
async fn test_json_text_frames_are_classified() {
    let (listener, url) = bind().await;
    spawn_echo_server(listener);

    let session = WebSocketSession::new(fast_config(url).no_reconnect());
    let mut messages = session.subscribe_messages();
    session.connect().await.unwrap();

    session
        .send_json(&serde_json::json!({"op": "subscribe", "channel": "ticks"}))
        .await
        .unwrap();

    let received = timeout(WAIT, messages.recv()).await.unwrap().unwrap();
    assert_eq!(
        received,
        WsMessage::Json(serde_json::json!({"op": "subscribe", "channel": "ticks"}))
    );

    session.disconnect().await;
}

#[tokio::test]
async fn test_binary_fanout_to_multiple_subscribers() {
    let (listener, url) = bind().await;
    spawn_echo_server(listener);

    let session = WebSocketSession::new(fast_config(url).no_reconnect());
    let mut first = session.subscribe_binary();
    let mut second = session.subscribe_binary();
    session.connect().await.unwrap();

    session.send_binary(vec![1u8, 2, 3]).await.unwrap();

    assert_eq!(timeout(WAIT, first.recv()).await.unwrap().unwrap(), vec![1, 2, 3]);
    assert_eq!(timeout(WAIT, second.recv()).await.unwrap().unwrap(), vec![1, 2, 3]);

    session.disconnect().await;
}

#[tokio::test]
async fn test_connect_twice_is_noop() {
    let (listener, url) = bind().await;
    spawn_echo_server(listener);

    let session = WebSocketSession::new(fast_config(url).no_reconnect());
    session.connect().await.unwrap();
    session.connect().await.unwrap();
    assert_eq!(session.state(), WebSocketState::Connected);

    session.disconnect().await;
}

#[tokio::test]
async fn test_reconnect_after_server_close() {
    let (listener, url) = bind().await;

    // First connection is closed by the server; later ones are kept open.
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.close(None).await.unwrap();

        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
                while let Some(Ok(_)) = ws.next().await {}
            });
        }
    });

    let session = WebSocketSession::new(fast_config(url).reconnect_attempts(5));
    let mut states = session.subscribe_state();
    session.connect().await.unwrap();

    timeout(WAIT, states.wait_for(|s| *s == WebSocketState::Reconnecting))
        .await
        .expect("session should enter the reconnection cycle")
        .unwrap();
    timeout(WAIT, states.wait_for(|s| *s == WebSocketState::Connected))
        .await
        .expect("session should reconnect")
        .unwrap();
    assert!(session.is_connected());

    session.disconnect().await;
}

#[tokio::test]
async fn test_remote_close_without_reconnect_lands_in_closed() {
    let (listener, url) = bind().await;

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.close(None).await.unwrap();
    });

    let session = WebSocketSession::new(fast_config(url).no_reconnect());
    let mut states = session.subscribe_state();
    session.connect().await.unwrap();

    timeout(WAIT, states.wait_for(|s| *s == WebSocketState::Closed))
        .await
        .expect("a clean remote close should land in the closed state")
        .unwrap();
    assert!(!session.is_connected());
}

#[tokio::test]
async fn test_disconnect_during_reconnection_stops_the_cycle() {
    let (listener, url) = bind().await;

    // Close the first connection, then keep accepting so any surviving
    // reconnection cycle would visibly succeed.
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.close(None).await.unwrap();

        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
                while let Some(Ok(_)) = ws.next().await {}
            });
        }
    });

    let session = WebSocketSession::new(
        fast_config(url)
            .reconnect_attempts(5)
            .reconnect_delay(Duration::from_millis(50)),
    );
    let mut states = session.subscribe_state();
    session.connect().await.unwrap();

    timeout(WAIT, states.wait_for(|s| *s == WebSocketState::Reconnecting))
        .await
        .expect("session should enter the reconnection cycle")
        .unwrap();
    session.disconnect().await;
    assert_eq!(session.state(), WebSocketState::Disconnected);

    // Long enough for a surviving cycle to have reconnected.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(session.state(), WebSocketState::Disconnected);
    assert!(!session.is_connected());
}

#[tokio::test]
async fn test_reconnect_budget_exhaustion_lands_in_error() {
    let (listener, url) = bind().await;

    // Accept exactly one connection, close it, then stop listening.
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.close(None).await.unwrap();
        drop(listener);
    });

    let session = WebSocketSession::new(fast_config(url).reconnect_attempts(2));
    let mut states = session.subscribe_state();
    session.connect().await.unwrap();

    timeout(WAIT, states.wait_for(|s| *s == WebSocketState::Error))
        .await
        .expect("session should give up after exhausting its budget")
        .unwrap();
    assert!(!session.is_connected());
}
