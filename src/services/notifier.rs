//! Telegram click notifications.
//!
//! Sends one `sendMessage` call per click with form fields `chat_id` and
//! `text`. Anything but a 200 from the Bot API is reported as an internal
//! error; nothing is retried.

use reqwest::StatusCode;
use tracing::{info, warn};

use crate::config::NotifyConfig;
use crate::error::{AppError, Result};

const SEND_FAILED: &str = "Failed to send notification";

/// Telegram Bot API client
#[derive(Debug, Clone)]
pub struct Notifier {
    client: reqwest::Client,
    config: NotifyConfig,
}

impl Notifier {
    pub fn new(client: reqwest::Client, config: NotifyConfig) -> Self {
        Self { client, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Send `text` to the configured chat
    pub async fn send(&self, text: &str) -> Result<()> {
        if !self.is_configured() {
            warn!("Notification requested but the Telegram bot is not configured");
            return Err(AppError::internal(SEND_FAILED));
        }

        // The URL embeds the bot token, keep it out of logs
        let response = self
            .client
            .post(self.config.send_message_url())
            .timeout(self.config.timeout())
            .form(&[
                ("chat_id", self.config.chat_id.as_str()),
                ("text", text),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e.without_url(), "Telegram request failed");
                AppError::internal(SEND_FAILED)
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "Telegram rejected notification");
            return Err(AppError::internal(SEND_FAILED));
        }

        info!(chat_id = %self.config.chat_id, "Notification sent");
        Ok(())
    }
}
