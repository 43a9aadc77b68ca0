//! # Relay Gateway
//!
//! An authenticated HTTP relay. Callers upload a file or report a page click;
//! the gateway checks the shared API key, validates the payload and forwards
//! it unchanged to a fixed destination.
//!
//! ## Features
//!
//! - **File relay**: `POST /file/{username}` forwards a multipart `file` to
//!   `{downstream}/file/{username}`
//! - **Click notifications**: `POST /click` posts a message to a Telegram chat
//! - **Configurable policy**: allowed filename suffixes and strict/permissive
//!   downstream error translation
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐     ┌──────────────────────────────┐     ┌──────────────────┐
//! │  Caller  │ ──▶ │ CORS ▸ auth ▸ handler        │ ──▶ │ Downstream files │
//! │          │ ◀── │ Forwarder / Notifier         │ ──▶ │ Telegram Bot API │
//! └──────────┘     └──────────────────────────────┘     └──────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! GATEWAY_API_KEY=secret DOWNSTREAM_URL=http://files:9000 cargo run --release
//!
//! curl -X POST http://localhost:8000/file/alice \
//!   -H "x-api-key: secret" -F "file=@notes.txt"
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod services;
pub mod state;

pub use config::{AuthConfig, Config};
pub use error::{AppError, Result};
pub use middleware::ApiKeyAuth;
pub use policy::{ErrorMode, ForwardPolicy};
pub use state::AppState;

use anyhow::Context;
use axum::{extract::DefaultBodyLimit, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Run the gateway with the given configuration until the server stops.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState::new(config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(address = %addr, "Relay gateway listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the gateway router
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_auth = ApiKeyAuth::new(&state.config.auth);

    info!(
        downstream = %state.config.downstream.base_url,
        error_mode = %state.config.policy.error_mode,
        allowed_extensions = ?state.config.policy.allowed_extensions,
        "Forwarding policy"
    );

    if !state.notifier.is_configured() {
        warn!("Telegram bot token or chat id missing, /click will fail");
    }

    let protected = Router::new()
        .merge(handlers::forward_routes())
        .merge(handlers::click_routes())
        .route_layer(api_auth.layer());

    Router::new()
        .merge(protected)
        .merge(handlers::root_routes())
        .nest("/health", handlers::health_routes())
        // Enforced by the body extractors, so auth rejects before any 413
        .layer(DefaultBodyLimit::max(state.max_body_size()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
