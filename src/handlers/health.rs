//! Health check endpoints.
//!
//! Public and unauthenticated; auth headers are ignored.

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::models::MessageResponse;
use crate::state::AppState;

/// Root greeting
///
/// GET /
async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Hello world!"))
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Server status
    pub status: &'static str,
    /// Server version
    pub version: &'static str,
}

/// Liveness probe - server is running
///
/// GET /health/live
async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Create the root route
pub fn root_routes() -> Router<AppState> {
    Router::new().route("/", get(root))
}

/// Create health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/live", get(liveness))
}
