//! Location event types.
//!
//! `LocationUpdate` is the raw ingress payload with every field optional so
//! the adapter can report exactly which mandatory fields are missing.
//! `LocationRecord` is the normalized result: validated coordinates, derived
//! battery status, and server-side receive timestamp. Timestamps are
//! milliseconds since the UNIX epoch.

use serde::{Deserialize, Serialize};

/// Battery percentage at or below which a drone is reported as low-battery.
pub const LOW_BATTERY_THRESHOLD: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DroneStatus {
    Active,
    LowBattery,
}

impl DroneStatus {
    pub fn from_battery(capacity: f64) -> Self {
        if capacity > LOW_BATTERY_THRESHOLD {
            Self::Active
        } else {
            Self::LowBattery
        }
    }
}

/// Raw location ping as posted by a drone or the simulator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdate {
    pub serial_number: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub battery_capacity: Option<f64>,
    pub timestamp: Option<i64>,
}

/// Normalized location record: what gets cached, persisted, and broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub serial_number: String,
    pub latitude: f64,
    pub longitude: f64,
    pub battery_capacity: f64,
    pub status: DroneStatus,
    pub timestamp: i64,
    pub received_at: i64,
}
