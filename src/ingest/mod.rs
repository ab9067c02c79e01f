//! The `ingest` module is the ingress adapter of the relay.
//!
//! It accepts raw events from the HTTP surface (direct drone pings and
//! relayed broadcast requests from the data provider), validates and
//! normalizes them, and dispatches the result: last-value cache write,
//! history append, room fan-out, and the non-blocking upstream forward.
//!
//! Validation failures reject the event before any side effect happens.

pub mod adapter;
pub mod error;
pub mod model;

pub use adapter::{IngestOutcome, IngressAdapter};
pub use error::IngestError;
pub use model::{DroneStatus, LocationRecord, LocationUpdate};

#[cfg(test)]
mod tests;
