//! File forwarding handler.
//!
//! - `POST /file/{username}` - relay a multipart `file` to the downstream service
//!
//! Authentication happens in the route layer, before this handler runs. The
//! filename is checked against the forwarding policy before the file bytes are
//! read, so rejected uploads never reach the downstream service. The username
//! is sent as a single percent-encoded path segment.
//!
//! # Example
//!
//! ```bash
//! curl -X POST http://localhost:8000/file/alice \
//!   -H "x-api-key: $GATEWAY_API_KEY" \
//!   -F "file=@notes.txt"
//! ```

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::models::Upload;
use crate::policy::ForwardPolicy;
use crate::state::AppState;

/// Handle a file upload and relay it
///
/// POST /file/{username}
///
/// The multipart stream and the upload are owned by this call and dropped on
/// every return path.
async fn forward_file(
    State(state): State<AppState>,
    Path(username): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    validate_username(&username)?;

    let upload = read_upload(&mut multipart, state.forwarder.policy()).await?;

    info!(
        username = %username,
        filename = %upload.filename,
        size = upload.len(),
        "Received upload"
    );

    let body = state.forwarder.forward(&username, upload).await?;

    Ok(Json(body))
}

/// Dot segments would be dropped or resolved when building the downstream URL
fn validate_username(username: &str) -> Result<()> {
    match username {
        "" | "." | ".." => Err(AppError::invalid_payload(format!(
            "Invalid username: {:?}",
            username
        ))),
        _ => Ok(()),
    }
}

/// Pull the `file` field out of the multipart body
async fn read_upload(multipart: &mut Multipart, policy: &ForwardPolicy) -> Result<Upload> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            debug!(field = ?field.name(), "Skipping multipart field");
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if !policy.is_allowed_filename(&filename) {
            return Err(AppError::invalid_payload(policy.rejection_message()));
        }

        let content_type = field.content_type().map(str::to_owned);
        let content = field.bytes().await.map_err(multipart_error)?;

        return Ok(Upload::new(filename, content, content_type.as_deref()));
    }

    Err(AppError::invalid_payload(
        "No file field found in multipart request",
    ))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large(err.body_text())
    } else {
        AppError::invalid_payload(format!("Invalid multipart data: {}", err.body_text()))
    }
}

/// Create file forwarding routes
pub fn forward_routes() -> Router<AppState> {
    Router::new().route("/file/{username}", post(forward_file))
}
