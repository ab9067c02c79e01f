//! Ingress validation and dispatch errors.
//!
//! These reject the event at the door: when any of them is returned, nothing
//! was stored and nothing was broadcast. `BroadcastUnavailable` is the one
//! exception reported after the fact — the fan-out hub could not be reached.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IngestError {
    #[error("Missing required fields: {0}")]
    MissingFields(String),

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: String },

    #[error("Missing {0} data")]
    MissingData(&'static str),

    #[error("Missing event name")]
    MissingEventName,

    #[error("WebSocket service not available")]
    BroadcastUnavailable,
}
