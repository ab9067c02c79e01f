//! The `client` module defines the representation of a connected subscriber.
//!
//! It provides the `Client` struct, which encapsulates the state of a single
//! WebSocket connection: its unique identifier and the channel used to push
//! outbound messages to it.

pub mod subscriber;
pub use subscriber::Client;
