//! API routes.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::api::handlers;
use crate::api::state::AppState;

/// Creates the HTTP router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/drones/location", post(handlers::post_location))
        .route("/drones/location/:serial", get(handlers::get_location_history))
        .route("/drones/active", get(handlers::get_active_drones))
        .route("/drones/stats", get(handlers::get_stats))
        .route("/broadcast/simulation", post(handlers::broadcast_simulation))
        .route("/broadcast/order", post(handlers::broadcast_order))
        .route("/broadcast/custom", post(handlers::broadcast_custom))
        .route("/broadcast/status", get(handlers::broadcast_status))
}
