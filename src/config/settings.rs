use serde::Deserialize;

/// Top-level configuration for the relay service.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub broker: BrokerSettings,
    pub cache: CacheSettings,
    pub history: HistorySettings,
    pub upstream: UpstreamSettings,
}

/// Bind addresses for the HTTP API and the WebSocket server.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub http_port: u16,
    pub ws_port: u16,
}

/// Fan-out hub parameters.
#[derive(Debug, Deserialize, Clone)]
pub struct BrokerSettings {
    pub heartbeat_interval_secs: u64,
}

/// Last-value cache parameters.
#[derive(Debug, Deserialize, Clone)]
pub struct CacheSettings {
    pub ttl_secs: u64,
    pub active_threshold_secs: u64,
}

/// Location history persistence parameters.
#[derive(Debug, Deserialize, Clone)]
pub struct HistorySettings {
    pub path: String,
    pub retention_secs: u64,
}

/// Upstream forwarding parameters. When `location_endpoint` is set, it is
/// the only endpoint tried; otherwise the well-known paths are tried against
/// `base_url` in order.
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamSettings {
    pub base_url: String,
    pub location_endpoint: Option<String>,
    pub timeout_secs: u64,
    pub queue_size: usize,
}

/// Partial configuration loaded from files or environment.
///
/// Allows partial specification of settings. Missing values are filled from
/// defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub broker: Option<PartialBrokerSettings>,
    pub cache: Option<PartialCacheSettings>,
    pub history: Option<PartialHistorySettings>,
    pub upstream: Option<PartialUpstreamSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub http_port: Option<u16>,
    pub ws_port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub heartbeat_interval_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialCacheSettings {
    pub ttl_secs: Option<u64>,
    pub active_threshold_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialHistorySettings {
    pub path: Option<String>,
    pub retention_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialUpstreamSettings {
    pub base_url: Option<String>,
    pub location_endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
    pub queue_size: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                http_port: 3001,
                ws_port: 3002,
            },
            broker: BrokerSettings {
                heartbeat_interval_secs: 30,
            },
            cache: CacheSettings {
                ttl_secs: 300,
                active_threshold_secs: 30,
            },
            history: HistorySettings {
                path: "droneflux_db".to_string(),
                retention_secs: 7 * 24 * 3600,
            },
            upstream: UpstreamSettings {
                base_url: "https://drone-flux-system-server.vercel.app".to_string(),
                location_endpoint: None,
                timeout_secs: 3,
                queue_size: 256,
            },
        }
    }
}
