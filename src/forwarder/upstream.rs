//! Ordered-fallback upstream delivery.
//!
//! The external tracking server exposes its location intake under one of a
//! handful of well-known paths depending on deployment. Rather than hide
//! that behind retry middleware, the candidate list is an explicit ordered
//! sequence: each endpoint gets one bounded attempt, the first 2xx
//! short-circuits, and exhausting the list is an informational failure —
//! never an error to the caller.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::UpstreamSettings;
use crate::ingest::model::{DroneStatus, LocationRecord};

/// Intake paths tried in order against the configured base URL when no
/// explicit endpoint is set.
pub const FALLBACK_PATHS: [&str; 6] = [
    "/api/drone-location",
    "/drone-location",
    "/api/location-update",
    "/location-update",
    "/api/tracking/update",
    "/tracking/update",
];

const USER_AGENT: &str = "Drone-Simulation-System/1.0";

/// Outbound payload sent to the tracking server.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamReport {
    pub serial_number: String,
    pub latitude: f64,
    pub longitude: f64,
    pub battery_capacity: f64,
    pub drone_status: DroneStatus,
    pub timestamp: i64,
    pub source: &'static str,
}

impl From<&LocationRecord> for UpstreamReport {
    fn from(record: &LocationRecord) -> Self {
        Self {
            serial_number: record.serial_number.clone(),
            latitude: record.latitude,
            longitude: record.longitude,
            battery_capacity: record.battery_capacity,
            drone_status: record.status,
            timestamp: record.timestamp,
            source: "drone_simulation",
        }
    }
}

/// Result of one forwarding call. Failure carries no error value because
/// the caller's flow never depends on upstream delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    Delivered { endpoint: String, attempts: u32 },
    Failed { attempts: u32 },
}

pub struct UpstreamForwarder {
    client: reqwest::Client,
    base_url: String,
    explicit_endpoint: Option<String>,
    timeout: Duration,
}

impl UpstreamForwarder {
    pub fn new(settings: &UpstreamSettings) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            explicit_endpoint: settings.location_endpoint.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    /// The ordered endpoint list for one forwarding call. An explicitly
    /// configured endpoint overrides the fallback discovery entirely.
    pub fn candidates(&self) -> Vec<String> {
        match &self.explicit_endpoint {
            Some(endpoint) => vec![endpoint.clone()],
            None => FALLBACK_PATHS
                .iter()
                .map(|path| format!("{}{path}", self.base_url))
                .collect(),
        }
    }

    /// Attempts delivery against each candidate in order, stopping at the
    /// first acknowledgement.
    pub async fn forward(&self, report: &UpstreamReport) -> ForwardOutcome {
        self.try_candidates(&self.candidates(), report).await
    }

    pub(crate) async fn try_candidates(
        &self,
        endpoints: &[String],
        report: &UpstreamReport,
    ) -> ForwardOutcome {
        let mut attempts = 0;

        for endpoint in endpoints {
            attempts += 1;
            let request = self.client.post(endpoint).json(report).send();

            match tokio::time::timeout(self.timeout, request).await {
                Ok(Ok(response)) if response.status().is_success() => {
                    debug!(endpoint = %endpoint, serial = %report.serial_number, "location report accepted upstream");
                    return ForwardOutcome::Delivered {
                        endpoint: endpoint.clone(),
                        attempts,
                    };
                }
                Ok(Ok(response)) => {
                    warn!(endpoint = %endpoint, status = %response.status(), "upstream rejected location report");
                }
                Ok(Err(e)) => {
                    warn!(endpoint = %endpoint, "upstream request failed: {e}");
                }
                Err(_) => {
                    warn!(endpoint = %endpoint, timeout = ?self.timeout, "upstream attempt timed out");
                }
            }
        }

        ForwardOutcome::Failed { attempts }
    }
}
