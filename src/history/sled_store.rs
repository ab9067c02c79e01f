use chrono::Utc;
use sled::Db;
use uuid::Uuid;

use crate::ingest::model::LocationRecord;

/// Append-only location history, one sled tree per drone serial.
///
/// Keys are the record's receive timestamp in big-endian milliseconds with a
/// UUID suffix, so iteration order is chronological and two pings landing in
/// the same millisecond don't collide. Values are the JSON-encoded record.
#[derive(Clone)]
pub struct LocationHistory {
    db: Db,
    retention_ms: i64,
}

impl LocationHistory {
    pub fn open(path: &str, retention_secs: u64) -> Result<Self, sled::Error> {
        let db = sled::open(path)?;
        Ok(Self {
            db,
            retention_ms: retention_secs as i64 * 1000,
        })
    }

    /// Appends one record to the serial's tree.
    pub fn append(&self, record: &LocationRecord) -> Result<(), sled::Error> {
        let encoded = match serde_json::to_vec(record) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(serial = %record.serial_number, "failed to encode location record: {e}");
                return Ok(());
            }
        };

        let mut key = [0u8; 24];
        key[..8].copy_from_slice(&record.received_at.to_be_bytes());
        key[8..].copy_from_slice(Uuid::new_v4().as_bytes());

        let tree = self.db.open_tree(&record.serial_number)?;
        tree.insert(key, encoded)?;
        Ok(())
    }

    /// The newest `limit` records for a serial, newest first. Expired records
    /// are removed before reading.
    pub fn recent(&self, serial: &str, limit: usize) -> Result<Vec<LocationRecord>, sled::Error> {
        self.cleanup_expired(serial)?;
        let tree = self.db.open_tree(serial)?;
        Ok(tree
            .iter()
            .rev()
            .filter_map(|res| res.ok())
            .filter_map(|(_, value)| serde_json::from_slice(&value).ok())
            .take(limit)
            .collect())
    }

    /// Total number of stored location updates across all drones.
    pub fn total_updates(&self) -> Result<usize, sled::Error> {
        let mut total = 0;
        for name in self.serial_trees() {
            total += self.db.open_tree(name)?.len();
        }
        Ok(total)
    }

    /// Number of distinct drone serials seen.
    pub fn unique_drones(&self) -> usize {
        self.serial_trees().count()
    }

    /// Number of updates received at or after `cutoff_ms` across all drones.
    pub fn updates_since(&self, cutoff_ms: i64) -> Result<usize, sled::Error> {
        let mut count = 0;
        for name in self.serial_trees() {
            let tree = self.db.open_tree(name)?;
            count += tree
                .range(cutoff_ms.to_be_bytes().to_vec()..)
                .filter(|res| res.is_ok())
                .count();
        }
        Ok(count)
    }

    fn serial_trees(&self) -> impl Iterator<Item = sled::IVec> {
        self.db
            .tree_names()
            .into_iter()
            .filter(|name| !name.starts_with(b"__"))
    }

    fn cleanup_expired(&self, serial: &str) -> Result<(), sled::Error> {
        if self.retention_ms <= 0 {
            return Ok(());
        }
        let cutoff = Utc::now().timestamp_millis() - self.retention_ms;

        let tree = self.db.open_tree(serial)?;
        let expired: Vec<_> = tree
            .range(..cutoff.to_be_bytes().to_vec())
            .filter_map(|res| res.ok())
            .map(|(key, _)| key)
            .collect();

        for key in expired {
            tree.remove(key)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for LocationHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationHistory")
            .field("db", &"sled::Db")
            .field("retention_ms", &self.retention_ms)
            .finish()
    }
}
