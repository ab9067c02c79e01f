//! The `forwarder` module handles best-effort upstream delivery.
//!
//! Location reports are handed to a bounded queue and delivered by a
//! background worker, so the ingress path never waits on upstream health.
//! Delivery tries an ordered list of candidate endpoints and stops at the
//! first acknowledgement; when an explicit endpoint is configured there is
//! no fallback list — one attempt, reported once.

pub mod upstream;
pub mod worker;

pub use upstream::{ForwardOutcome, UpstreamForwarder, UpstreamReport};

#[cfg(test)]
mod tests;
