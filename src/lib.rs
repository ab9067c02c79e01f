//! # droneflux
//!
//! `droneflux` is the real-time relay core of a drone-delivery demo: it
//! accepts drone location pings and simulation events over HTTP, keeps the
//! last known position per drone, fans live updates out to WebSocket
//! subscribers, and best-effort forwards location reports to an external
//! tracking server.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `broker`: The fan-out hub that manages rooms, subscribers, and event delivery.
//! - `client`: Represents a connected WebSocket subscriber.
//! - `store`: In-memory last-value cache of the most recent ping per drone.
//! - `history`: Sled-backed append-only location history for queries and stats.
//! - `forwarder`: Best-effort upstream delivery with ordered endpoint fallback.
//! - `ingest`: Validates and normalizes inbound events and dispatches them.
//! - `api`: The axum HTTP surface (location ingress, broadcast, queries).
//! - `transport`: The WebSocket server and the subscription protocol.
//! - `config`: Handles loading and managing service configuration.
//! - `utils`: Shared utilities, such as tracing setup.

pub mod api;
pub mod broker;
pub mod client;
pub mod config;
pub mod forwarder;
pub mod history;
pub mod ingest;
pub mod store;
pub mod transport;
pub mod utils;
