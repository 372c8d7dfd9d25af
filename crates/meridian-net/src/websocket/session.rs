//! WebSocket session with automatic reconnection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::config::WebSocketConfig;
use super::message::{WebSocketState, WsMessage};
use crate::error::{NetworkError, Result};

/// Type alias for a connected WebSocket stream.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const CHANNEL_CAPACITY: usize = 256;

/// Callbacks invoked on session lifecycle events and inbound messages.
///
/// All hooks default to no-ops. Channel subscribers receive the same events;
/// this trait exists for components that want push delivery without polling a
/// receiver.
#[async_trait]
pub trait WebSocketEvents: Send + Sync {
    /// The session established a connection.
    async fn on_connected(&self) {}
    /// The session lost or closed its connection.
    async fn on_disconnected(&self) {}
    /// A connection or protocol error occurred.
    async fn on_error(&self, _error: &NetworkError) {}
    /// An inbound message arrived.
    async fn on_message(&self, _message: &WsMessage) {}
}

struct SessionShared {
    config: WebSocketConfig,
    state_tx: watch::Sender<WebSocketState>,
    message_tx: broadcast::Sender<WsMessage>,
    text_tx: broadcast::Sender<String>,
    binary_tx: broadcast::Sender<Vec<u8>>,
    events: Option<Arc<dyn WebSocketEvents>>,
    sink: tokio::sync::Mutex<Option<SplitSink<WsStream, Message>>>,
    worker: parking_lot::Mutex<Option<JoinHandle<()>>>,
    connected: AtomicBool,
    // Set by disconnect() before the worker is aborted, so a worker that is
    // mid-teardown never starts a reconnection cycle the abort cannot reach.
    closing: AtomicBool,
}

impl SessionShared {
    fn set_state(&self, state: WebSocketState) {
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            tracing::debug!(
                target: "meridian_net::websocket",
                url = %self.config.url,
                ?state,
                "session state changed"
            );
            *current = state;
            true
        });
    }

    async fn emit_error(&self, error: &NetworkError) {
        tracing::warn!(target: "meridian_net::websocket", url = %self.config.url, %error, "session error");
        if let Some(events) = &self.events {
            events.on_error(error).await;
        }
    }
}

/// Outcome of a listener loop.
enum ListenerExit {
    /// The remote closed cleanly or the stream ended.
    Closed,
    /// The stream yielded an error.
    Failed,
}

/// A managed WebSocket connection.
///
/// The session owns the connection lifecycle: handshake with timeout,
/// keepalive pings, fan-out of inbound messages to any number of
/// subscribers, and automatic reconnection with linearly growing delays
/// after an unexpected close.
///
/// State transitions are observable through [`subscribe_state`]; the
/// receiver always yields the latest state first, so late subscribers never
/// miss where the session currently stands.
///
/// # Example
///
/// ```ignore
/// let config = WebSocketConfig::new("wss://stream.example.com/live")
///     .header("Authorization", "Bearer token");
/// let session = WebSocketSession::new(config);
///
/// let mut messages = session.subscribe_messages();
/// session.connect().await?;
/// session.send_text("hello").await?;
/// while let Ok(message) = messages.recv().await {
///     println!("received: {message:?}");
/// }
/// ```
///
/// [`subscribe_state`]: Self::subscribe_state
pub struct WebSocketSession {
    shared: Arc<SessionShared>,
}

impl WebSocketSession {
    /// Create a session with the given configuration.
    pub fn new(config: WebSocketConfig) -> Self {
        Self::build(config, None)
    }

    /// Create a session that also delivers events through callbacks.
    pub fn with_events(config: WebSocketConfig, events: Arc<dyn WebSocketEvents>) -> Self {
        Self::build(config, Some(events))
    }

    fn build(config: WebSocketConfig, events: Option<Arc<dyn WebSocketEvents>>) -> Self {
        let (state_tx, _) = watch::channel(WebSocketState::Disconnected);
        let (message_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (text_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (binary_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(SessionShared {
                config,
                state_tx,
                message_tx,
                text_tx,
                binary_tx,
                events,
                sink: tokio::sync::Mutex::new(None),
                worker: parking_lot::Mutex::new(None),
                connected: AtomicBool::new(false),
                closing: AtomicBool::new(false),
            }),
        }
    }

    /// The configured endpoint URL.
    pub fn url(&self) -> &str {
        &self.shared.config.url
    }

    /// The current session state.
    pub fn state(&self) -> WebSocketState {
        *self.shared.state_tx.borrow()
    }

    /// Whether the session is currently connected.
    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    /// Watch session state transitions. The receiver yields the current
    /// state immediately.
    pub fn subscribe_state(&self) -> watch::Receiver<WebSocketState> {
        self.shared.state_tx.subscribe()
    }

    /// Subscribe to all inbound messages.
    pub fn subscribe_messages(&self) -> broadcast::Receiver<WsMessage> {
        self.shared.message_tx.subscribe()
    }

    /// Subscribe to inbound text frames only.
    pub fn subscribe_text(&self) -> broadcast::Receiver<String> {
        self.shared.text_tx.subscribe()
    }

    /// Subscribe to inbound binary frames only.
    pub fn subscribe_binary(&self) -> broadcast::Receiver<Vec<u8>> {
        self.shared.binary_tx.subscribe()
    }

    /// Connect to the configured endpoint.
    ///
    /// No-op when already connected. On failure the session moves to the
    /// `Error` state and the classified error is returned; no reconnection
    /// cycle is started for an initial connect failure.
    pub async fn connect(&self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }
        self.shared.closing.store(false, Ordering::SeqCst);

        match open_stream(&self.shared).await {
            Ok(stream) => {
                let worker = tokio::spawn(run_session(Arc::clone(&self.shared), stream));
                if let Some(old) = self.shared.worker.lock().replace(worker) {
                    old.abort();
                }
                Ok(())
            }
            Err(error) => {
                self.shared.set_state(WebSocketState::Error);
                self.shared.emit_error(&error).await;
                Err(error)
            }
        }
    }

    /// Close the connection and stop any reconnection cycle.
    ///
    /// Idempotent; a session that is already disconnected stays put.
    pub async fn disconnect(&self) {
        self.shared.closing.store(true, Ordering::SeqCst);
        if let Some(handle) = self.shared.worker.lock().take() {
            handle.abort();
        }

        let was_connected = self.shared.connected.swap(false, Ordering::SeqCst);
        if let Some(mut sink) = self.shared.sink.lock().await.take() {
            let _ = sink.send(Message::Close(None)).await;
            let _ = sink.close().await;
        }

        self.shared.set_state(WebSocketState::Disconnected);
        if was_connected {
            if let Some(events) = &self.shared.events {
                events.on_disconnected().await;
            }
        }
    }

    /// Send a text frame.
    pub async fn send_text(&self, text: impl Into<String>) -> Result<()> {
        self.send_frame(Message::Text(text.into().into())).await
    }

    /// Send a binary frame.
    pub async fn send_binary(&self, data: impl Into<Vec<u8>>) -> Result<()> {
        self.send_frame(Message::Binary(data.into().into())).await
    }

    /// Serialize a value to JSON and send it as a text frame.
    pub async fn send_json<T: serde::Serialize>(&self, value: &T) -> Result<()> {
        let text = serde_json::to_string(value)?;
        self.send_text(text).await
    }

    async fn send_frame(&self, message: Message) -> Result<()> {
        let mut sink = self.shared.sink.lock().await;
        match sink.as_mut() {
            Some(sink) => sink.send(message).await.map_err(NetworkError::from),
            None => Err(NetworkError::NetworkUnavailable),
        }
    }
}

impl Drop for WebSocketSession {
    fn drop(&mut self) {
        self.shared.closing.store(true, Ordering::SeqCst);
        if let Some(handle) = self.shared.worker.lock().take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for WebSocketSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketSession")
            .field("url", &self.shared.config.url)
            .field("state", &*self.shared.state_tx.borrow())
            .finish()
    }
}

/// One handshake: on success the sink is installed and the session is
/// `Connected`; the read half is returned for the worker to drive. Never
/// spawns; the caller decides what runs the stream.
async fn open_stream(shared: &SessionShared) -> Result<SplitStream<WsStream>> {
    shared.set_state(WebSocketState::Connecting);

    let stream = handshake(shared).await?;
    let (sink, stream) = stream.split();
    *shared.sink.lock().await = Some(sink);
    shared.connected.store(true, Ordering::SeqCst);
    shared.set_state(WebSocketState::Connected);

    if let Some(events) = &shared.events {
        events.on_connected().await;
    }
    Ok(stream)
}

async fn handshake(shared: &SessionShared) -> Result<WsStream> {
    let mut request = shared
        .config
        .url
        .as_str()
        .into_client_request()
        .map_err(NetworkError::from)?;

    let headers = request.headers_mut();
    for (name, value) in &shared.config.headers {
        match (
            http::HeaderName::try_from(name.as_str()),
            http::HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => {
                tracing::warn!(target: "meridian_net::websocket", %name, "skipping invalid handshake header");
            }
        }
    }

    let connect = tokio_tungstenite::connect_async(request);
    match tokio::time::timeout(shared.config.timeout, connect).await {
        Ok(Ok((stream, _response))) => Ok(stream),
        Ok(Err(error)) => Err(NetworkError::from(error)),
        Err(_) => Err(NetworkError::Timeout(format!(
            "handshake with {} timed out",
            shared.config.url
        ))),
    }
}

/// Worker task driving one logical session across reconnections.
///
/// Listens until the connection ends, tears down, then either stops (explicit
/// disconnect, no reconnect budget) or runs the reconnection cycle and keeps
/// listening on the replacement stream. One worker exists per session, so an
/// abort from `disconnect` reaches everything.
async fn run_session(shared: Arc<SessionShared>, mut stream: SplitStream<WsStream>) {
    loop {
        let exit = listen(&shared, &mut stream).await;

        shared.connected.store(false, Ordering::SeqCst);
        *shared.sink.lock().await = None;
        if shared.closing.load(Ordering::SeqCst) {
            return;
        }

        let reconnecting = shared.config.reconnect_attempts > 0;
        shared.set_state(match exit {
            ListenerExit::Closed if !reconnecting => WebSocketState::Closed,
            ListenerExit::Closed => WebSocketState::Disconnected,
            ListenerExit::Failed => WebSocketState::Error,
        });
        if let Some(events) = &shared.events {
            events.on_disconnected().await;
        }
        if !reconnecting {
            return;
        }

        match reconnect(&shared).await {
            Some(replacement) => stream = replacement,
            None => return,
        }
    }
}

/// Read frames until the connection ends.
async fn listen(shared: &SessionShared, stream: &mut SplitStream<WsStream>) -> ListenerExit {
    let mut ping = tokio::time::interval_at(
        tokio::time::Instant::now() + shared.config.ping_interval,
        shared.config.ping_interval,
    );

    loop {
        tokio::select! {
            _ = ping.tick() => {
                let mut sink = shared.sink.lock().await;
                if let Some(sink) = sink.as_mut() {
                    if let Err(error) = sink.send(Message::Ping(Bytes::new())).await {
                        shared.emit_error(&NetworkError::from(error)).await;
                        return ListenerExit::Failed;
                    }
                }
            }
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        let text = text.to_string();
                        let _ = shared.text_tx.send(text.clone());
                        publish(shared, WsMessage::from_text(text)).await;
                    }
                    Some(Ok(Message::Binary(data))) => {
                        let data = data.to_vec();
                        let _ = shared.binary_tx.send(data.clone());
                        publish(shared, WsMessage::Binary(data)).await;
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                        // Pong replies are handled by tungstenite.
                    }
                    Some(Ok(Message::Close(_))) | None => return ListenerExit::Closed,
                    Some(Ok(Message::Frame(_))) => {}
                    Some(Err(error)) => {
                        shared.emit_error(&NetworkError::from(error)).await;
                        return ListenerExit::Failed;
                    }
                }
            }
        }
    }
}

async fn publish(shared: &SessionShared, message: WsMessage) {
    if let Some(events) = &shared.events {
        events.on_message(&message).await;
    }
    let _ = shared.message_tx.send(message);
}

/// Reconnection cycle: delays grow linearly with the attempt number, and the
/// session lands in `Error` when the budget runs out.
async fn reconnect(shared: &SessionShared) -> Option<SplitStream<WsStream>> {
    let attempts = shared.config.reconnect_attempts;
    for attempt in 0..attempts {
        shared.set_state(WebSocketState::Reconnecting);
        let delay = shared.config.reconnect_delay * (attempt + 1);
        tracing::debug!(
            target: "meridian_net::websocket",
            url = %shared.config.url,
            attempt = attempt + 1,
            delay_ms = delay.as_millis() as u64,
            "reconnecting"
        );
        tokio::time::sleep(delay).await;
        if shared.closing.load(Ordering::SeqCst) {
            return None;
        }

        match open_stream(shared).await {
            Ok(stream) => return Some(stream),
            Err(error) => shared.emit_error(&error).await,
        }
    }

    tracing::warn!(
        target: "meridian_net::websocket",
        url = %shared.config.url,
        attempts,
        "reconnection budget exhausted"
    );
    shared.set_state(WebSocketState::Error);
    None
}
