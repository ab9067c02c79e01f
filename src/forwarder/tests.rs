use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::http::StatusCode;
use tokio::sync::mpsc;

use super::upstream::{FALLBACK_PATHS, ForwardOutcome, UpstreamForwarder, UpstreamReport};
use super::worker;
use crate::config::UpstreamSettings;
use crate::ingest::model::DroneStatus;

fn report() -> UpstreamReport {
    UpstreamReport {
        serial_number: "DRONE-001".to_string(),
        latitude: 40.0,
        longitude: -74.0,
        battery_capacity: 85.0,
        drone_status: DroneStatus::Active,
        timestamp: chrono::Utc::now().timestamp_millis(),
        source: "drone_simulation",
    }
}

fn forwarder_with(base_url: &str, explicit: Option<String>) -> UpstreamForwarder {
    UpstreamForwarder::new(&UpstreamSettings {
        base_url: base_url.to_string(),
        location_endpoint: explicit,
        timeout_secs: 2,
        queue_size: 8,
    })
}

/// Spawns an HTTP endpoint that answers every request with `status` and
/// counts how many requests it saw.
async fn spawn_endpoint(status: StatusCode) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().fallback(move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            status
        }
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/intake"), hits)
}

/// An address with nothing listening on it, so connections are refused.
async fn dead_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/intake")
}

#[test]
fn test_candidates_without_explicit_endpoint() {
    let forwarder = forwarder_with("https://tracker.example.com/", None);
    let candidates = forwarder.candidates();

    assert_eq!(candidates.len(), FALLBACK_PATHS.len());
    assert_eq!(candidates[0], "https://tracker.example.com/api/drone-location");
    assert_eq!(candidates[5], "https://tracker.example.com/tracking/update");
}

#[test]
fn test_explicit_endpoint_overrides_fallback_list() {
    let forwarder = forwarder_with(
        "https://tracker.example.com",
        Some("https://other.example.com/intake".to_string()),
    );
    assert_eq!(forwarder.candidates(), ["https://other.example.com/intake"]);
}

#[tokio::test]
async fn test_forward_stops_at_first_success() {
    let (a, a_hits) = spawn_endpoint(StatusCode::INTERNAL_SERVER_ERROR).await;
    let (b, b_hits) = spawn_endpoint(StatusCode::NOT_FOUND).await;
    let (c, c_hits) = spawn_endpoint(StatusCode::OK).await;
    let (d, d_hits) = spawn_endpoint(StatusCode::OK).await;

    let forwarder = forwarder_with("http://unused.invalid", None);
    let outcome = forwarder
        .try_candidates(&[a, b, c.clone(), d], &report())
        .await;

    assert_eq!(
        outcome,
        ForwardOutcome::Delivered {
            endpoint: c,
            attempts: 3
        }
    );
    assert_eq!(a_hits.load(Ordering::SeqCst), 1);
    assert_eq!(b_hits.load(Ordering::SeqCst), 1);
    assert_eq!(c_hits.load(Ordering::SeqCst), 1);
    assert_eq!(d_hits.load(Ordering::SeqCst), 0, "no attempt after success");
}

#[tokio::test]
async fn test_forward_first_candidate_success_is_single_attempt() {
    let (a, a_hits) = spawn_endpoint(StatusCode::OK).await;

    let forwarder = forwarder_with("http://unused.invalid", None);
    let outcome = forwarder.try_candidates(&[a.clone()], &report()).await;

    assert_eq!(
        outcome,
        ForwardOutcome::Delivered {
            endpoint: a,
            attempts: 1
        }
    );
    assert_eq!(a_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_explicit_endpoint_failure_makes_exactly_one_attempt() {
    let (failing, failing_hits) = spawn_endpoint(StatusCode::SERVICE_UNAVAILABLE).await;
    let (fallback_base, base_hits) = spawn_endpoint(StatusCode::OK).await;
    let base_url = fallback_base.trim_end_matches("/intake").to_string();

    let forwarder = forwarder_with(&base_url, Some(failing));
    let outcome = forwarder.forward(&report()).await;

    assert_eq!(outcome, ForwardOutcome::Failed { attempts: 1 });
    assert_eq!(failing_hits.load(Ordering::SeqCst), 1);
    assert_eq!(
        base_hits.load(Ordering::SeqCst),
        0,
        "explicit configuration must not fall back to discovery"
    );
}

#[tokio::test]
async fn test_forward_reports_failure_when_all_candidates_fail() {
    let a = dead_endpoint().await;
    let (b, _) = spawn_endpoint(StatusCode::BAD_GATEWAY).await;

    let forwarder = forwarder_with("http://unused.invalid", None);
    let outcome = forwarder.try_candidates(&[a, b], &report()).await;

    assert_eq!(outcome, ForwardOutcome::Failed { attempts: 2 });
}

#[tokio::test]
async fn test_worker_drains_queue() {
    let (endpoint, hits) = spawn_endpoint(StatusCode::OK).await;

    let forwarder = forwarder_with("http://unused.invalid", Some(endpoint));
    let (tx, rx) = mpsc::channel(8);
    tokio::spawn(worker::run(forwarder, rx));

    tx.send(report()).await.unwrap();
    tx.send(report()).await.unwrap();

    // The worker runs deliveries sequentially; give it a moment.
    for _ in 0..50 {
        if hits.load(Ordering::SeqCst) == 2 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}
