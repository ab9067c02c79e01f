//! HTTP handlers.
//!
//! Thin translations between HTTP and the ingress adapter / stores. Response
//! shapes follow what the map frontend and the data provider already speak:
//! `success` flags, camelCase fields, `clientsNotified` counts.

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::ingest::LocationUpdate;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    pub data: Option<Value>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CustomBroadcastRequest {
    pub event: Option<String>,
    pub data: Option<Value>,
    pub room: Option<String>,
}

/// POST /api/drones/location — ingest one location ping.
pub async fn post_location(
    State(state): State<Arc<AppState>>,
    Json(update): Json<LocationUpdate>,
) -> ApiResult<Json<Value>> {
    let outcome = state.ingest.ingest_location(update)?;

    let message = if outcome.live {
        "Location updated successfully"
    } else {
        "Location stored, live broadcast unavailable"
    };
    Ok(Json(json!({
        "success": true,
        "message": message,
        "data": outcome.record,
        "clientsNotified": outcome.clients_notified,
    })))
}

/// GET /api/drones/location/:serial — recent history, newest first.
pub async fn get_location_history(
    State(state): State<Arc<AppState>>,
    Path(serial): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Value>> {
    let limit = query.limit.unwrap_or(100);
    let locations = state.history.recent(&serial, limit)?;

    Ok(Json(json!({
        "success": true,
        "serialNumber": serial,
        "count": locations.len(),
        "locations": locations,
    })))
}

/// GET /api/drones/active — drones that pinged within the active threshold.
pub async fn get_active_drones(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let threshold = Duration::from_secs(state.settings.cache.active_threshold_secs);
    let drones = match state.cache.lock() {
        Ok(cache) => cache.active_since(threshold),
        Err(poisoned) => poisoned.into_inner().active_since(threshold),
    };

    Ok(Json(json!({
        "success": true,
        "count": drones.len(),
        "drones": drones,
    })))
}

/// GET /api/drones/stats — counters over the history store and the cache.
pub async fn get_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let hour_ago = Utc::now().timestamp_millis() - 3_600_000;
    let total = state.history.total_updates()?;
    let recent = state.history.updates_since(hour_ago)?;
    let unique = state.history.unique_drones();
    let active = match state.cache.lock() {
        Ok(cache) => cache.len(),
        Err(poisoned) => poisoned.into_inner().len(),
    };

    Ok(Json(json!({
        "success": true,
        "stats": {
            "totalLocationUpdates": total,
            "uniqueDrones": unique,
            "recentUpdates": recent,
            "activeDrones": active,
        },
    })))
}

/// POST /api/broadcast/simulation — relay simulation data to all clients.
pub async fn broadcast_simulation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BroadcastRequest>,
) -> ApiResult<Json<Value>> {
    let notified = state
        .ingest
        .ingest_simulation(request.data, request.timestamp)?;
    Ok(broadcast_response("simulation", notified))
}

/// POST /api/broadcast/order — relay an order notification to all clients.
pub async fn broadcast_order(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BroadcastRequest>,
) -> ApiResult<Json<Value>> {
    let notified = state.ingest.ingest_order(request.data, request.timestamp)?;
    Ok(broadcast_response("order", notified))
}

/// POST /api/broadcast/custom — relay a producer-named event, optionally
/// scoped to a room.
pub async fn broadcast_custom(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CustomBroadcastRequest>,
) -> ApiResult<Json<Value>> {
    let room = request.room.clone();
    let notified = state
        .ingest
        .ingest_custom(request.event, request.data, request.room)?;

    Ok(Json(json!({
        "success": true,
        "message": "Custom event broadcasted successfully",
        "room": room.unwrap_or_else(|| "all".to_string()),
        "clientsNotified": notified,
    })))
}

/// GET /api/broadcast/status — fan-out availability and client count.
pub async fn broadcast_status(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let connected = state
        .broker
        .lock()
        .map(|broker| broker.client_count())
        .map_err(|_| ApiError::BroadcastUnavailable)?;

    Ok(Json(json!({
        "service": "WebSocket Broadcast Service",
        "status": "available",
        "connectedClients": connected,
        "timestamp": Utc::now().to_rfc3339(),
        "capabilities": {
            "simulationBroadcast": true,
            "orderBroadcast": true,
            "customBroadcast": true,
            "roomSupport": true,
        },
    })))
}

/// GET /health — liveness.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "uptimeSecs": state.started_at.elapsed().as_secs(),
    }))
}

fn broadcast_response(kind: &str, notified: usize) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": format!("{kind} data broadcasted successfully"),
        "clientsNotified": notified,
    }))
}
