use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio::sync::mpsc;
use tungstenite::protocol::Message as WsMessage;

use super::adapter::IngressAdapter;
use super::error::IngestError;
use super::model::{DroneStatus, LocationUpdate};
use crate::broker::{ALL_DRONES_ROOM, Broker, Envelope};
use crate::client::Client;
use crate::forwarder::UpstreamReport;
use crate::history::LocationHistory;
use crate::store::LastValueCache;

struct Fixture {
    adapter: IngressAdapter,
    broker: Arc<Mutex<Broker>>,
    cache: Arc<Mutex<LastValueCache>>,
    history: LocationHistory,
    forward_rx: mpsc::Receiver<UpstreamReport>,
    _dir: tempfile::TempDir,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let history = LocationHistory::open(dir.path().to_str().unwrap(), 3600).unwrap();
    let broker = Arc::new(Mutex::new(Broker::new()));
    let cache = Arc::new(Mutex::new(LastValueCache::new(300)));
    let (forward_tx, forward_rx) = mpsc::channel(8);

    let adapter = IngressAdapter::new(
        broker.clone(),
        cache.clone(),
        history.clone(),
        forward_tx,
    );

    Fixture {
        adapter,
        broker,
        cache,
        history,
        forward_rx,
        _dir: dir,
    }
}

fn subscribe(fixture: &Fixture, room: &str) -> mpsc::UnboundedReceiver<WsMessage> {
    let (tx, rx) = mpsc::unbounded_channel();
    let client = Client::new(tx);
    let id = client.id.clone();
    let mut broker = fixture.broker.lock().unwrap();
    broker.register_client(client);
    broker.subscribe(room, id);
    rx
}

fn recv_envelope(rx: &mut mpsc::UnboundedReceiver<WsMessage>) -> Envelope {
    match rx.try_recv().unwrap() {
        WsMessage::Text(text) => serde_json::from_str(&text).unwrap(),
        other => panic!("expected a text message, got {other:?}"),
    }
}

fn d1_ping() -> LocationUpdate {
    LocationUpdate {
        serial_number: Some("D1".to_string()),
        latitude: Some(40.0),
        longitude: Some(-74.0),
        battery_capacity: Some(85.0),
        timestamp: None,
    }
}

#[test]
fn test_location_ping_stores_broadcasts_and_queues() {
    let mut fixture = fixture();
    let mut per_drone = subscribe(&fixture, "drone_D1");
    let mut wildcard = subscribe(&fixture, ALL_DRONES_ROOM);

    let outcome = fixture.adapter.ingest_location(d1_ping()).unwrap();

    assert_eq!(outcome.record.serial_number, "D1");
    assert_eq!(outcome.record.status, DroneStatus::Active);
    assert_eq!(outcome.clients_notified, 2);
    assert!(outcome.live);

    // Event Store holds the normalized record.
    let cache = fixture.cache.lock().unwrap();
    let cached = cache.get("D1").unwrap();
    assert_eq!(cached.record.latitude, 40.0);
    assert_eq!(cached.record.battery_capacity, 85.0);
    drop(cache);

    // Both the per-drone room and the wildcard room get exactly one copy.
    let drone_msg = recv_envelope(&mut per_drone);
    assert_eq!(drone_msg.event, "locationUpdate");
    assert_eq!(drone_msg.data["serialNumber"], "D1");
    assert!(per_drone.try_recv().is_err());

    let all_msg = recv_envelope(&mut wildcard);
    assert_eq!(all_msg.event, "locationUpdate");
    assert!(wildcard.try_recv().is_err());

    // History recorded the ping.
    assert_eq!(fixture.history.recent("D1", 10).unwrap().len(), 1);

    // Upstream report was queued without blocking.
    let report = fixture.forward_rx.try_recv().unwrap();
    assert_eq!(report.serial_number, "D1");
    assert_eq!(report.source, "drone_simulation");
}

#[test]
fn test_low_battery_status_derivation() {
    let fixture = fixture();
    let outcome = fixture
        .adapter
        .ingest_location(LocationUpdate {
            battery_capacity: Some(15.0),
            ..d1_ping()
        })
        .unwrap();
    assert_eq!(outcome.record.status, DroneStatus::LowBattery);
}

#[test]
fn test_missing_latitude_rejected_with_no_side_effects() {
    let mut fixture = fixture();
    let mut wildcard = subscribe(&fixture, ALL_DRONES_ROOM);

    let err = fixture
        .adapter
        .ingest_location(LocationUpdate {
            latitude: None,
            ..d1_ping()
        })
        .unwrap_err();

    assert_eq!(err, IngestError::MissingFields("latitude".to_string()));
    assert!(fixture.cache.lock().unwrap().is_empty());
    assert!(fixture.history.recent("D1", 10).unwrap().is_empty());
    assert!(wildcard.try_recv().is_err());
    assert!(fixture.forward_rx.try_recv().is_err());
}

#[test]
fn test_all_missing_fields_are_reported() {
    let fixture = fixture();
    let err = fixture
        .adapter
        .ingest_location(LocationUpdate::default())
        .unwrap_err();
    assert_eq!(
        err,
        IngestError::MissingFields(
            "serialNumber, latitude, longitude, batteryCapacity".to_string()
        )
    );
}

#[test]
fn test_out_of_range_latitude_rejected() {
    let fixture = fixture();
    let err = fixture
        .adapter
        .ingest_location(LocationUpdate {
            latitude: Some(91.0),
            ..d1_ping()
        })
        .unwrap_err();
    assert!(matches!(err, IngestError::OutOfRange { field: "latitude", .. }));
    assert!(fixture.cache.lock().unwrap().is_empty());
}

#[test]
fn test_non_finite_coordinate_rejected() {
    let fixture = fixture();
    let err = fixture
        .adapter
        .ingest_location(LocationUpdate {
            longitude: Some(f64::NAN),
            ..d1_ping()
        })
        .unwrap_err();
    assert!(matches!(err, IngestError::OutOfRange { field: "longitude", .. }));
}

#[test]
fn test_simulation_broadcast_reaches_all_clients() {
    let mut fixture = fixture();
    let mut a = subscribe(&fixture, "drone_D1");
    let mut b = subscribe(&fixture, "unrelated_room");

    let notified = fixture
        .adapter
        .ingest_simulation(Some(json!({"tick": 1})), None)
        .unwrap();

    assert_eq!(notified, 2);
    let msg = recv_envelope(&mut a);
    assert_eq!(msg.event, "simulationData");
    assert_eq!(msg.data["tick"], 1);
    assert_eq!(msg.data["source"], "data_provider");
    assert!(msg.data["broadcastTimestamp"].is_string());
    assert_eq!(recv_envelope(&mut b).event, "simulationData");
}

#[test]
fn test_simulation_broadcast_requires_data() {
    let fixture = fixture();
    let err = fixture.adapter.ingest_simulation(None, None).unwrap_err();
    assert_eq!(err, IngestError::MissingData("simulation"));
}

#[test]
fn test_order_broadcast_event_name() {
    let mut fixture = fixture();
    let mut rx = subscribe(&fixture, "anywhere");

    fixture
        .adapter
        .ingest_order(Some(json!({"orderId": "ORD-9"})), None)
        .unwrap();

    assert_eq!(recv_envelope(&mut rx).event, "orderNotification");
}

#[test]
fn test_custom_broadcast_scoped_to_room() {
    let mut fixture = fixture();
    let mut in_room = subscribe(&fixture, "ops_room");
    let mut outside = subscribe(&fixture, "other_room");

    let notified = fixture
        .adapter
        .ingest_custom(
            Some("maintenanceAlert".to_string()),
            Some(json!({"severity": "high"})),
            Some("ops_room".to_string()),
        )
        .unwrap();

    assert_eq!(notified, 1);
    assert_eq!(recv_envelope(&mut in_room).event, "maintenanceAlert");
    assert!(outside.try_recv().is_err());
}

#[test]
fn test_custom_broadcast_requires_event_and_data() {
    let fixture = fixture();
    assert_eq!(
        fixture
            .adapter
            .ingest_custom(None, Some(json!({})), None)
            .unwrap_err(),
        IngestError::MissingEventName
    );
    assert_eq!(
        fixture
            .adapter
            .ingest_custom(Some("x".to_string()), None, None)
            .unwrap_err(),
        IngestError::MissingData("custom")
    );
}

#[test]
fn test_same_key_race_resolves_last_write_wins() {
    let fixture = fixture();
    fixture.adapter.ingest_location(d1_ping()).unwrap();
    fixture
        .adapter
        .ingest_location(LocationUpdate {
            latitude: Some(41.0),
            ..d1_ping()
        })
        .unwrap();

    let cache = fixture.cache.lock().unwrap();
    assert_eq!(cache.get("D1").unwrap().record.latitude, 41.0);
    assert_eq!(cache.len(), 1);
}
