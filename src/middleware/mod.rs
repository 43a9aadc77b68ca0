//! Middleware components for the relay gateway.
//!
//! This module contains middleware for:
//! - API key authentication

pub mod auth;

pub use auth::{ApiKeyAuth, ApiKeyAuthLayer};
