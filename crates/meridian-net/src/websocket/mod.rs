//! Managed WebSocket sessions.

mod config;
mod message;
mod session;

pub use config::WebSocketConfig;
pub use message::{WebSocketState, WsMessage};
pub use session::{WebSocketEvents, WebSocketSession};
