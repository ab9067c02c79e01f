//! Application state shared across handlers.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::broker::Broker;
use crate::config::Settings;
use crate::history::LocationHistory;
use crate::ingest::IngressAdapter;
use crate::store::LastValueCache;

pub struct AppState {
    pub ingest: IngressAdapter,
    pub broker: Arc<Mutex<Broker>>,
    pub cache: Arc<Mutex<LastValueCache>>,
    pub history: LocationHistory,
    pub settings: Settings,
    pub started_at: Instant,
}
