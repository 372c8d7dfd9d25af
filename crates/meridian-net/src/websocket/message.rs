//! Session state and inbound message types.

/// Lifecycle state of a WebSocket session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WebSocketState {
    /// No connection and none in progress.
    #[default]
    Disconnected,
    /// Handshake in flight.
    Connecting,
    /// Connected and exchanging frames.
    Connected,
    /// Connection lost, reconnection cycle running.
    Reconnecting,
    /// Terminal failure: connect failed or the reconnection budget was
    /// exhausted.
    Error,
    /// Remote closed the connection cleanly and no reconnection is
    /// configured. An unsolicited close with reconnection enabled passes
    /// through `Disconnected` into `Reconnecting` instead; an explicit
    /// `disconnect` always lands in `Disconnected`.
    Closed,
}

/// An inbound message.
///
/// Text frames that parse as JSON are surfaced as `Json`; everything else
/// stays raw.
#[derive(Clone, Debug, PartialEq)]
pub enum WsMessage {
    /// A non-JSON text frame.
    Text(String),
    /// A binary frame.
    Binary(Vec<u8>),
    /// A text frame that parsed as JSON.
    Json(serde_json::Value),
}

impl WsMessage {
    /// Classify a text frame.
    pub fn from_text(text: String) -> Self {
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(text),
        }
    }
}
