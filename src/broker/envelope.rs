//! Event envelope delivered to subscribers.
//!
//! `Envelope` is the unit the broker fans out. The `data` field is opaque to
//! the relay: whatever JSON the producer supplied passes through unmodified.
//! `timestamp` is milliseconds since the UNIX epoch, stamped when the
//! envelope is built.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub event: String,
    pub data: Value,
    pub timestamp: i64,
}

impl Envelope {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}
