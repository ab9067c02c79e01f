//! The `transport` module handles WebSocket communication with subscribers.
//!
//! It defines the subscription protocol spoken by map clients and the data
//! provider, and implements the WebSocket server itself: accepting
//! connections, parsing protocol messages, and forwarding subscription
//! changes to the broker.

pub mod message;
pub mod websocket;

pub use message::{CAPABILITIES, ClientMessage, ServerMessage};
pub use websocket::start_websocket_server;
