//! Forwarding policy.
//!
//! One value decides which filenames may be relayed and how downstream
//! failures are reported back to the caller. Every request goes through the
//! same policy, so a deployment never mixes error translation styles.
//!
//! ```toml
//! [policy]
//! allowed_extensions = [".txt", ".png"]
//! error_mode = "strict"
//! ```

use axum::http::StatusCode;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// How downstream failures are translated into caller-facing errors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Error statuses are passed through, unreachable downstream is a 503
    #[default]
    Strict,
    /// Every downstream failure becomes a 500 carrying the underlying message
    Permissive,
}

impl FromStr for ErrorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "permissive" => Ok(Self::Permissive),
            other => Err(format!(
                "error_mode must be \"strict\" or \"permissive\", got {:?}",
                other
            )),
        }
    }
}

impl fmt::Display for ErrorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("strict"),
            Self::Permissive => f.write_str("permissive"),
        }
    }
}

/// What went wrong while talking to the downstream service
#[derive(Debug)]
pub enum DownstreamFailure {
    /// Downstream answered, but not with a 2xx
    Status { status: StatusCode, body: String },
    /// Downstream could not be reached or did not answer in time
    Transport(String),
    /// Anything else (unreadable or non-JSON success body, request build errors)
    Unexpected(String),
}

impl From<reqwest::Error> for DownstreamFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::Transport(err.to_string())
        } else {
            Self::Unexpected(err.to_string())
        }
    }
}

/// Filename allow-list and error translation mode
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ForwardPolicy {
    /// Accepted filename suffixes, matched case-sensitively (e.g. ".txt")
    pub allowed_extensions: Vec<String>,
    pub error_mode: ErrorMode,
}

impl Default for ForwardPolicy {
    fn default() -> Self {
        Self {
            allowed_extensions: vec![".txt".to_string(), ".png".to_string()],
            error_mode: ErrorMode::Strict,
        }
    }
}

impl ForwardPolicy {
    /// Check a filename against the suffix allow-list
    pub fn is_allowed_filename(&self, filename: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|ext| filename.ends_with(ext.as_str()))
    }

    /// Detail returned when a filename is rejected
    pub fn rejection_message(&self) -> String {
        format!(
            "Only {} files are allowed for forwarding",
            self.allowed_extensions.join(", ")
        )
    }

    /// Translate a downstream failure according to the configured mode
    pub fn translate(&self, failure: DownstreamFailure) -> AppError {
        match (self.error_mode, failure) {
            (ErrorMode::Strict, DownstreamFailure::Status { status, body }) => {
                // Only error statuses are passed through verbatim
                let status = if status.is_client_error() || status.is_server_error() {
                    status
                } else {
                    StatusCode::BAD_GATEWAY
                };
                AppError::downstream(status, format!("Downstream server error: {}", body))
            }
            (ErrorMode::Strict, DownstreamFailure::Transport(msg)) => AppError::service_unavailable(
                format!("Could not connect to downstream server: {}", msg),
            ),
            (ErrorMode::Strict, DownstreamFailure::Unexpected(msg)) => {
                AppError::internal(format!("Unexpected error while forwarding: {}", msg))
            }
            (ErrorMode::Permissive, DownstreamFailure::Status { status, body }) => {
                AppError::internal(format!(
                    "Error forwarding file: downstream returned {}: {}",
                    status, body
                ))
            }
            (ErrorMode::Permissive, DownstreamFailure::Transport(msg))
            | (ErrorMode::Permissive, DownstreamFailure::Unexpected(msg)) => {
                AppError::internal(format!("Error forwarding file: {}", msg))
            }
        }
    }
}
