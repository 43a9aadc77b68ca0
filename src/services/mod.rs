//! Service layer for the relay gateway.
//!
//! Outbound collaborators:
//! - Downstream file service (upload forwarding)
//! - Telegram Bot API (click notifications)

pub mod forwarder;
pub mod notifier;

pub use forwarder::{Forwarder, API_KEY_HEADER};
pub use notifier::Notifier;
