use std::time::Duration;

use super::last_value::LastValueCache;
use crate::ingest::model::{DroneStatus, LocationRecord};

fn record(serial: &str, latitude: f64) -> LocationRecord {
    let now = chrono::Utc::now().timestamp_millis();
    LocationRecord {
        serial_number: serial.to_string(),
        latitude,
        longitude: -74.0,
        battery_capacity: 85.0,
        status: DroneStatus::Active,
        timestamp: now,
        received_at: now,
    }
}

#[test]
fn test_put_then_get() {
    let mut cache = LastValueCache::new(300);
    cache.put(record("D1", 40.0));

    let entry = cache.get("D1").unwrap();
    assert_eq!(entry.record.latitude, 40.0);
    assert!(cache.get("D2").is_none());
}

#[test]
fn test_put_overwrites_last_write_wins() {
    let mut cache = LastValueCache::new(300);
    cache.put(record("D1", 40.0));
    cache.put(record("D1", 41.5));

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("D1").unwrap().record.latitude, 41.5);
}

#[test]
fn test_most_recent_returns_latest_write() {
    let mut cache = LastValueCache::new(300);
    cache.put(record("D1", 40.0));
    cache.put(record("D3", 42.0));
    cache.put(record("D2", 41.0));

    // The last put wins regardless of serial ordering; stamps are strictly
    // monotonic even within one millisecond.
    let latest = cache.most_recent().unwrap();
    assert_eq!(latest.record.serial_number, "D2");
}

#[test]
fn test_most_recent_of_empty_cache() {
    let cache = LastValueCache::new(300);
    assert!(cache.most_recent().is_none());
}

#[test]
fn test_list_contains_all_serials() {
    let mut cache = LastValueCache::new(300);
    cache.put(record("D1", 40.0));
    cache.put(record("D2", 41.0));

    let mut serials: Vec<&String> = cache.list().map(|(serial, _)| serial).collect();
    serials.sort();
    assert_eq!(serials, ["D1", "D2"]);
}

#[test]
fn test_ttl_sweep_evicts_stale_entries() {
    let mut cache = LastValueCache::new(300);
    cache.put(record("D1", 40.0));

    // Age the entry past the TTL, then trigger a sweep via a later write.
    let future = chrono::Utc::now().timestamp_millis() + 301_000;
    cache.sweep(future);

    assert!(cache.get("D1").is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_zero_ttl_disables_eviction() {
    let mut cache = LastValueCache::new(0);
    cache.put(record("D1", 40.0));

    let future = chrono::Utc::now().timestamp_millis() + 10_000_000;
    cache.sweep(future);

    assert!(cache.get("D1").is_some());
}

#[test]
fn test_active_since_filters_by_write_time() {
    let mut cache = LastValueCache::new(300);
    cache.put(record("D1", 40.0));
    cache.put(record("D2", 41.0));

    let active = cache.active_since(Duration::from_secs(30));
    assert_eq!(active.len(), 2);

    let active = cache.active_since(Duration::ZERO);
    assert!(active.len() <= 2);
}
