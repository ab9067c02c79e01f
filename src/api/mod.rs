//! The `api` module exposes the relay over HTTP.
//!
//! Location pings and broadcast requests come in here, get handed to the
//! ingress adapter, and queries (history, active drones, stats, broadcast
//! status) read from the stores. Errors map to JSON bodies with the
//! appropriate status code.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
