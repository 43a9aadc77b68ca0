//! Click notification models.

use serde::{Deserialize, Serialize};

/// Body of `POST /click`
#[derive(Debug, Clone, Deserialize)]
pub struct ClickEvent {
    /// Page the click happened on
    pub page: String,
}

impl ClickEvent {
    /// Text of the chat message announcing this click
    pub fn notification_text(&self) -> String {
        format!("🚨 Notificação de clique recebida na página: {}", self.page)
    }
}

/// Simple `{"message": ...}` acknowledgment body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
