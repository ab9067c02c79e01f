//! The `config` module loads layered service configuration.
//!
//! Values come from an optional `config/default` file overlaid with
//! environment variables, merged field-by-field onto built-in defaults so a
//! bare process starts with sensible demo settings.

pub mod settings;

use config::{Config, ConfigError, Environment, File};

use settings::PartialSettings;
pub use settings::{
    BrokerSettings, CacheSettings, HistorySettings, ServerSettings, Settings, UpstreamSettings,
};


/// Loads configuration from the default file and environment variables and
/// merges it with built-in defaults.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("_"));

    let config = builder.build()?;

    // Deserialize what is available, then fill the gaps from defaults.
    let partial: PartialSettings = config.try_deserialize()?;
    let default = Settings::default();

    Ok(Settings {
        server: ServerSettings {
            host: partial
                .server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            http_port: partial
                .server
                .as_ref()
                .and_then(|s| s.http_port)
                .unwrap_or(default.server.http_port),
            ws_port: partial
                .server
                .as_ref()
                .and_then(|s| s.ws_port)
                .unwrap_or(default.server.ws_port),
        },
        broker: BrokerSettings {
            heartbeat_interval_secs: partial
                .broker
                .as_ref()
                .and_then(|b| b.heartbeat_interval_secs)
                .unwrap_or(default.broker.heartbeat_interval_secs),
        },
        cache: CacheSettings {
            ttl_secs: partial
                .cache
                .as_ref()
                .and_then(|c| c.ttl_secs)
                .unwrap_or(default.cache.ttl_secs),
            active_threshold_secs: partial
                .cache
                .as_ref()
                .and_then(|c| c.active_threshold_secs)
                .unwrap_or(default.cache.active_threshold_secs),
        },
        history: HistorySettings {
            path: partial
                .history
                .as_ref()
                .and_then(|h| h.path.clone())
                .unwrap_or(default.history.path),
            retention_secs: partial
                .history
                .as_ref()
                .and_then(|h| h.retention_secs)
                .unwrap_or(default.history.retention_secs),
        },
        upstream: UpstreamSettings {
            base_url: partial
                .upstream
                .as_ref()
                .and_then(|u| u.base_url.clone())
                .unwrap_or(default.upstream.base_url),
            location_endpoint: partial
                .upstream
                .as_ref()
                .and_then(|u| u.location_endpoint.clone())
                .or(default.upstream.location_endpoint),
            timeout_secs: partial
                .upstream
                .as_ref()
                .and_then(|u| u.timeout_secs)
                .unwrap_or(default.upstream.timeout_secs),
            queue_size: partial
                .upstream
                .as_ref()
                .and_then(|u| u.queue_size)
                .unwrap_or(default.upstream.queue_size),
        },
    })
}
