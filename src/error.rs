//! Error types for the relay gateway.
//!
//! This module defines a unified error handling system using `thiserror`.
//! All errors are converted to HTTP responses carrying a JSON body with the
//! error kind and a human-readable detail string.
//!
//! # Error Categories
//!
//! - **Client errors (4xx)**: missing/invalid API key, rejected payloads
//! - **Downstream errors**: the relayed-to service answered with an error
//!   status, which is passed through with the same status code
//! - **Server errors (5xx)**: downstream unreachable, unexpected failures
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::error::{AppError, Result};
//!
//! fn check_name(name: &str) -> Result<()> {
//!     if name.is_empty() {
//!         return Err(AppError::invalid_payload("Filename is empty"));
//!     }
//!     Ok(())
//! }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
///
/// Each variant is mapped to an HTTP status code by [`AppError::status_code`].
#[derive(Debug, Error)]
pub enum AppError {
    // -------------------------------------------------------------------------
    // Client Errors (4xx)
    // -------------------------------------------------------------------------
    /// Missing or wrong API key
    #[error("{0}")]
    Unauthorized(String),

    /// Request body rejected (disallowed extension, malformed multipart)
    #[error("{0}")]
    InvalidPayload(String),

    /// Request body exceeds the configured limit
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    // -------------------------------------------------------------------------
    // Downstream passthrough
    // -------------------------------------------------------------------------
    /// The downstream service answered with a non-success status
    #[error("{detail}")]
    Downstream { status: StatusCode, detail: String },

    // -------------------------------------------------------------------------
    // Server Errors (5xx)
    // -------------------------------------------------------------------------
    /// Downstream could not be reached (connect failure, timeout)
    #[error("{0}")]
    ServiceUnavailable(String),

    /// Internal server error
    #[error("{0}")]
    Internal(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    // -------------------------------------------------------------------------
    // Convenience constructors
    // -------------------------------------------------------------------------

    pub fn unauthorized<S: Into<String>>(msg: S) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn invalid_payload<S: Into<String>>(msg: S) -> Self {
        Self::InvalidPayload(msg.into())
    }

    pub fn payload_too_large<S: Into<String>>(msg: S) -> Self {
        Self::PayloadTooLarge(msg.into())
    }

    pub fn downstream<S: Into<String>>(status: StatusCode, detail: S) -> Self {
        Self::Downstream {
            status,
            detail: detail.into(),
        }
    }

    pub fn service_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::ServiceUnavailable(msg.into())
    }

    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Downstream { status, .. } => *status,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error kind used in the response body
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::InvalidPayload(_) => "invalid_payload",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::Downstream { .. } => "downstream_error",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::Internal(_) => "internal_error",
            Self::Config(_) => "config_error",
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

/// Error response body sent to clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error kind
    pub error: String,
    /// Human-readable error detail
    pub detail: String,
    /// HTTP status code, same as the response status
    pub status: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, detail: impl Into<String>, status: StatusCode) -> Self {
        Self {
            error: error.into(),
            detail: detail.into(),
            status: status.as_u16(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Server error occurred");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Client error occurred");
        }

        // Details are returned as-is; they describe the relay hop, not local internals
        let body = ErrorResponse::new(self.kind(), self.to_string(), status);

        (status, Json(body)).into_response()
    }
}
