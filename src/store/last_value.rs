//! Last-value cache keyed by drone serial number.
//!
//! All operations are total. Two concurrent writers for the same serial
//! resolve by last-write-wins: mutations are single-step upserts under the
//! owner's lock, and whichever write lands last is the visible value.
//!
//! `stored_at` stamps are strictly monotonic within one cache instance, so
//! `most_recent` has a deterministic answer even when writes land inside the
//! same millisecond.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;

use crate::ingest::model::LocationRecord;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub record: LocationRecord,
    pub stored_at: i64,
}

#[derive(Debug)]
pub struct LastValueCache {
    entries: HashMap<String, CacheEntry>,
    ttl_ms: i64,
    last_stamp: i64,
}

impl LastValueCache {
    /// Create a cache whose entries expire `ttl_secs` after their last write.
    /// A TTL of zero disables eviction.
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: HashMap::new(),
            ttl_ms: ttl_secs as i64 * 1000,
            last_stamp: 0,
        }
    }

    /// Overwrites the entry for the record's serial unconditionally and
    /// sweeps expired entries.
    pub fn put(&mut self, record: LocationRecord) {
        let now = Utc::now().timestamp_millis();
        self.sweep(now);

        let stored_at = now.max(self.last_stamp + 1);
        self.last_stamp = stored_at;
        self.entries
            .insert(record.serial_number.clone(), CacheEntry { record, stored_at });
    }

    pub fn get(&self, serial: &str) -> Option<&CacheEntry> {
        self.entries.get(serial)
    }

    /// Entry with the greatest `stored_at` across all serials: the most
    /// recently seen drone when no serial is specified.
    pub fn most_recent(&self) -> Option<&CacheEntry> {
        self.entries.values().max_by_key(|entry| entry.stored_at)
    }

    /// All entries, in unspecified order.
    pub fn list(&self) -> impl Iterator<Item = (&String, &CacheEntry)> {
        self.entries.iter()
    }

    /// Records written within the last `threshold`. Backs the active-drones
    /// query.
    pub fn active_since(&self, threshold: Duration) -> Vec<LocationRecord> {
        let cutoff = Utc::now().timestamp_millis() - threshold.as_millis() as i64;
        self.entries
            .values()
            .filter(|entry| entry.stored_at >= cutoff)
            .map(|entry| entry.record.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn sweep(&mut self, now: i64) {
        if self.ttl_ms > 0 {
            let cutoff = now - self.ttl_ms;
            self.entries.retain(|_, entry| entry.stored_at > cutoff);
        }
    }
}
