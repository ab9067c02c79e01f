//! Connected subscriber handle.
//!
//! `Client` models one WebSocket connection and holds the sending side of the
//! per-connection channel the broker pushes messages through. The id is
//! assigned on connect and is the handle every subscription is keyed by.

use tokio::sync::mpsc::UnboundedSender;
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

#[derive(Debug)]
pub struct Client {
    pub id: String,
    pub sender: UnboundedSender<WsMessage>,
}

impl Client {
    /// Create a new client with a sender channel. The `id` is a UUID used
    /// to identify the connection across broker operations.
    pub fn new(sender: UnboundedSender<WsMessage>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
        }
    }
}
