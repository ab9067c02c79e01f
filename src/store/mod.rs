//! The `store` module holds the ephemeral last-value cache.
//!
//! One entry per drone serial, overwritten on every ingress ping. Entries
//! older than the configured TTL are swept on write, so the cache stays
//! bounded by the set of drones seen recently rather than growing for the
//! lifetime of the process.

pub mod last_value;

pub use last_value::{CacheEntry, LastValueCache};

#[cfg(test)]
mod tests;
