//! The `broker` module is the fan-out hub of the relay.
//!
//! It tracks rooms (topics) and their subscriber sets, delivers event
//! envelopes to subscribed connections, and runs the periodic system-status
//! heartbeat. Delivery is fire-and-forget: at most one send per subscriber
//! per publish, no queuing and no redelivery.

pub mod engine;
pub mod envelope;
pub mod topic;

pub use engine::{ALL_DRONES_ROOM, Broker, drone_room};
pub use envelope::Envelope;
