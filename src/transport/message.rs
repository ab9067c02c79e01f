//! Subscription protocol messages.
//!
//! Clients speak tagged JSON. Drone subscriptions address a serial number
//! (the reserved serial `"all"` joins the wildcard room); everything else is
//! addressed by topic name. Broadcast payloads themselves arrive as
//! `Envelope`s, not as `ServerMessage` variants.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event kinds a connected client can expect, advertised in the welcome.
pub const CAPABILITIES: [&str; 4] = [
    "locationUpdate",
    "simulationData",
    "orderNotification",
    "systemStatus",
];

#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "subscribeToDrone", rename_all = "camelCase")]
    SubscribeToDrone { serial_number: String },

    #[serde(rename = "unsubscribeFromDrone", rename_all = "camelCase")]
    UnsubscribeFromDrone { serial_number: String },

    #[serde(rename = "subscribeToTopic")]
    SubscribeToTopic { topic: String },

    #[serde(rename = "unsubscribeFromTopic")]
    UnsubscribeFromTopic { topic: String },

    #[serde(rename = "ping")]
    Ping {
        #[serde(default)]
        data: Value,
    },
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "connected", rename_all = "camelCase")]
    Connected {
        message: String,
        client_id: String,
        capabilities: Vec<String>,
        timestamp: i64,
    },

    #[serde(rename = "subscribed")]
    Subscribed { message: String, room: String },

    #[serde(rename = "unsubscribed")]
    Unsubscribed { room: String },

    #[serde(rename = "pong", rename_all = "camelCase")]
    Pong {
        data: Value,
        server_time: i64,
        client_id: String,
    },

    #[serde(rename = "error")]
    Error { message: String },
}
