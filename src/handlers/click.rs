//! Click notification handler.
//!
//! - `POST /click` - announce a page click in the configured Telegram chat

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::info;

use crate::error::{AppError, Result};
use crate::models::{ClickEvent, MessageResponse};
use crate::state::AppState;

/// POST /click
///
/// Body: `{"page": "/pricing"}`
async fn notify_click(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ClickEvent>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let Json(event) = payload.map_err(json_error)?;

    info!(page = %event.page, "Click received");

    state.notifier.send(&event.notification_text()).await?;

    Ok(Json(MessageResponse::new("Notification sent")))
}

fn json_error(err: JsonRejection) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large(err.body_text())
    } else {
        AppError::invalid_payload(err.body_text())
    }
}

/// Create click notification routes
pub fn click_routes() -> Router<AppState> {
    Router::new().route("/click", post(notify_click))
}
