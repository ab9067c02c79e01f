//! Ingress dispatch.
//!
//! `IngressAdapter` owns the path from a validated event to its side
//! effects: history append, last-value cache write, room fan-out, and the
//! queued upstream forward. It is constructed once at startup and injected
//! into the HTTP handlers; nothing here is ambient state.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::broker::{ALL_DRONES_ROOM, Broker, Envelope, drone_room};
use crate::forwarder::UpstreamReport;
use crate::history::LocationHistory;
use crate::ingest::error::IngestError;
use crate::ingest::model::{DroneStatus, LocationRecord, LocationUpdate};
use crate::store::LastValueCache;

/// What happened to an accepted location ping. `live` is false when the
/// fan-out hub could not be reached; the store write still happened and the
/// caller is told delivery was not live.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub record: LocationRecord,
    pub clients_notified: usize,
    pub live: bool,
}

pub struct IngressAdapter {
    broker: Arc<Mutex<Broker>>,
    cache: Arc<Mutex<LastValueCache>>,
    history: LocationHistory,
    forward_queue: mpsc::Sender<UpstreamReport>,
}

impl IngressAdapter {
    pub fn new(
        broker: Arc<Mutex<Broker>>,
        cache: Arc<Mutex<LastValueCache>>,
        history: LocationHistory,
        forward_queue: mpsc::Sender<UpstreamReport>,
    ) -> Self {
        Self {
            broker,
            cache,
            history,
            forward_queue,
        }
    }

    /// Validates and dispatches one location ping. Rejection happens before
    /// any side effect; on success the record is persisted, cached,
    /// broadcast to the drone's room and the wildcard room, and queued for
    /// upstream forwarding without blocking.
    pub fn ingest_location(&self, update: LocationUpdate) -> Result<IngestOutcome, IngestError> {
        let record = normalize(update)?;

        if let Err(e) = self.history.append(&record) {
            warn!(serial = %record.serial_number, "failed to append location history: {e}");
        }

        match self.cache.lock() {
            Ok(mut cache) => cache.put(record.clone()),
            Err(poisoned) => poisoned.into_inner().put(record.clone()),
        }

        let (clients_notified, live) = match self.broker.lock() {
            Ok(broker) => {
                let envelope = Envelope::new(
                    "locationUpdate",
                    serde_json::to_value(&record).unwrap_or(Value::Null),
                );
                let room = drone_room(&record.serial_number);
                (broker.publish_many(&[&room, ALL_DRONES_ROOM], &envelope), true)
            }
            Err(e) => {
                warn!("broadcast skipped, broker unavailable: {e}");
                (0, false)
            }
        };

        if let Err(e) = self.forward_queue.try_send(UpstreamReport::from(&record)) {
            warn!(serial = %record.serial_number, "dropping upstream report, queue unavailable: {e}");
        }

        debug!(
            serial = %record.serial_number,
            latitude = record.latitude,
            longitude = record.longitude,
            battery = record.battery_capacity,
            clients_notified,
            "location update ingested"
        );

        Ok(IngestOutcome {
            record,
            clients_notified,
            live,
        })
    }

    /// Relays simulation data from the data provider to every connected
    /// client. Returns the number of clients notified.
    pub fn ingest_simulation(
        &self,
        data: Option<Value>,
        timestamp: Option<String>,
    ) -> Result<usize, IngestError> {
        let data = data.ok_or(IngestError::MissingData("simulation"))?;
        self.broadcast("simulationData", data, timestamp, None)
    }

    /// Relays an order notification to every connected client.
    pub fn ingest_order(
        &self,
        data: Option<Value>,
        timestamp: Option<String>,
    ) -> Result<usize, IngestError> {
        let data = data.ok_or(IngestError::MissingData("order"))?;
        self.broadcast("orderNotification", data, timestamp, None)
    }

    /// Relays a producer-named event, optionally scoped to one room.
    pub fn ingest_custom(
        &self,
        event: Option<String>,
        data: Option<Value>,
        room: Option<String>,
    ) -> Result<usize, IngestError> {
        let event = event
            .filter(|name| !name.is_empty())
            .ok_or(IngestError::MissingEventName)?;
        let data = data.ok_or(IngestError::MissingData("custom"))?;
        self.broadcast(&event, data, None, room)
    }

    fn broadcast(
        &self,
        event: &str,
        mut data: Value,
        timestamp: Option<String>,
        room: Option<String>,
    ) -> Result<usize, IngestError> {
        // Stamp relay metadata into object payloads, the way downstream
        // clients expect; non-object payloads pass through untouched.
        if let Some(fields) = data.as_object_mut() {
            fields.insert(
                "broadcastTimestamp".to_string(),
                Value::String(timestamp.unwrap_or_else(|| Utc::now().to_rfc3339())),
            );
            fields.insert("source".to_string(), Value::String("data_provider".to_string()));
        }

        let broker = self
            .broker
            .lock()
            .map_err(|_| IngestError::BroadcastUnavailable)?;
        let envelope = Envelope::new(event, data);

        let notified = match room {
            Some(room) => broker.publish(&room, &envelope),
            None => broker.broadcast_all(&envelope),
        };
        debug!(event, notified, "broadcast relayed");
        Ok(notified)
    }
}

/// Field presence and bounds checks. Everything mandatory must be present
/// and finite: |latitude| <= 90, |longitude| <= 180, battery in 0..=100.
fn normalize(update: LocationUpdate) -> Result<LocationRecord, IngestError> {
    let mut missing = Vec::new();
    if update.serial_number.as_deref().is_none_or(str::is_empty) {
        missing.push("serialNumber");
    }
    if update.latitude.is_none() {
        missing.push("latitude");
    }
    if update.longitude.is_none() {
        missing.push("longitude");
    }
    if update.battery_capacity.is_none() {
        missing.push("batteryCapacity");
    }
    if !missing.is_empty() {
        return Err(IngestError::MissingFields(missing.join(", ")));
    }

    let latitude = update.latitude.unwrap_or_default();
    let longitude = update.longitude.unwrap_or_default();
    let battery_capacity = update.battery_capacity.unwrap_or_default();

    if !latitude.is_finite() || latitude.abs() > 90.0 {
        return Err(IngestError::OutOfRange {
            field: "latitude",
            value: latitude.to_string(),
        });
    }
    if !longitude.is_finite() || longitude.abs() > 180.0 {
        return Err(IngestError::OutOfRange {
            field: "longitude",
            value: longitude.to_string(),
        });
    }
    if !battery_capacity.is_finite() || !(0.0..=100.0).contains(&battery_capacity) {
        return Err(IngestError::OutOfRange {
            field: "batteryCapacity",
            value: battery_capacity.to_string(),
        });
    }

    let now = Utc::now().timestamp_millis();
    Ok(LocationRecord {
        serial_number: update.serial_number.unwrap_or_default(),
        latitude,
        longitude,
        battery_capacity,
        status: DroneStatus::from_battery(battery_capacity),
        timestamp: update.timestamp.unwrap_or(now),
        received_at: now,
    })
}
