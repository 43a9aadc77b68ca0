//! HTTP request handlers for the relay gateway.
//!
//! - `forward`: relays uploaded files to the downstream service
//! - `click`: click notifications to Telegram
//! - `health`: root greeting and liveness probe

pub mod click;
pub mod forward;
pub mod health;

pub use click::click_routes;
pub use forward::forward_routes;
pub use health::{health_routes, root_routes};
