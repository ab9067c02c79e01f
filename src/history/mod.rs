//! The `history` module persists location pings for later queries.
//!
//! It is the long-term counterpart of the last-value cache: an append-only,
//! timestamped log per drone serial, backed by `sled`. Retention is
//! time-based (7 days by default) and expired records are cleaned up lazily
//! when a serial's history is read.

pub mod sled_store;

pub use sled_store::LocationHistory;
