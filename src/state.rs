//! Application state management.
//!
//! This module defines the shared application state that is accessible
//! from all request handlers via Axum's State extractor. It is built once at
//! startup and never mutated afterwards.
//!
//! # Usage
//!
//! ```rust,ignore
//! async fn handler(State(state): State<AppState>) -> impl IntoResponse {
//!     state.notifier.send("hello").await?;
//!     // ...
//! }
//! ```

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::{Forwarder, Notifier};
use std::sync::Arc;

/// Shared application state
///
/// Cloned into each request handler; every field is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,

    /// Downstream file service client
    pub forwarder: Arc<Forwarder>,

    /// Telegram notification client
    pub notifier: Arc<Notifier>,
}

impl AppState {
    /// Create a new application state
    ///
    /// # Errors
    /// Returns error if the outbound HTTP client cannot be built
    pub fn new(config: Config) -> Result<Self> {
        // Timeouts are set per request, the pool is shared by both services
        let client = reqwest::Client::builder()
            .user_agent(concat!("relay-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::config(format!("Failed to create HTTP client: {}", e)))?;

        let forwarder = Forwarder::new(
            client.clone(),
            config.downstream.clone(),
            config.policy.clone(),
        );
        let notifier = Notifier::new(client, config.notify.clone());

        Ok(Self {
            config: Arc::new(config),
            forwarder: Arc::new(forwarder),
            notifier: Arc::new(notifier),
        })
    }

    /// Shared secret expected from callers
    pub fn api_key(&self) -> &str {
        &self.config.auth.api_key
    }

    /// Maximum accepted request body in bytes
    pub fn max_body_size(&self) -> usize {
        self.config.server.max_body_size
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &"<Config>")
            .field("forwarder", &"<Forwarder>")
            .field("notifier", &"<Notifier>")
            .finish()
    }
}
