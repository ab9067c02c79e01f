use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{error, info};

use droneflux::api::{AppState, create_router};
use droneflux::broker::Broker;
use droneflux::config::load_config;
use droneflux::forwarder::{UpstreamForwarder, worker};
use droneflux::history::LocationHistory;
use droneflux::ingest::IngressAdapter;
use droneflux::store::LastValueCache;
use droneflux::transport::start_websocket_server;
use droneflux::utils::logging;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    logging::init("info");

    if let Err(e) = run().await {
        error!("fatal: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_config()?;

    let history = LocationHistory::open(&settings.history.path, settings.history.retention_secs)?;
    let broker = Arc::new(Mutex::new(Broker::new()));
    let cache = Arc::new(Mutex::new(LastValueCache::new(settings.cache.ttl_secs)));

    let forwarder = UpstreamForwarder::new(&settings.upstream);
    let (forward_tx, forward_rx) = mpsc::channel(settings.upstream.queue_size);
    tokio::spawn(worker::run(forwarder, forward_rx));

    tokio::spawn(Broker::start_status_loop(
        broker.clone(),
        Duration::from_secs(settings.broker.heartbeat_interval_secs),
    ));

    let ingest = IngressAdapter::new(broker.clone(), cache.clone(), history.clone(), forward_tx);
    let state = Arc::new(AppState {
        ingest,
        broker: broker.clone(),
        cache,
        history,
        settings: settings.clone(),
        started_at: Instant::now(),
    });

    let http_addr = format!("{}:{}", settings.server.host, settings.server.http_port);
    let ws_addr = format!("{}:{}", settings.server.host, settings.server.ws_port);

    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    info!("HTTP API listening on http://{http_addr}");

    let router = create_router(state);

    tokio::select! {
        result = axum::serve(listener, router) => {
            if let Err(e) = result {
                error!("HTTP server error: {e}");
            }
        }
        _ = start_websocket_server(&ws_addr, broker) => {
            error!("WebSocket server stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
        }
    }

    Ok(())
}
