//! Data models for the relay gateway.
//!
//! Everything here is request-scoped; nothing is persisted.

mod click;
mod upload;

pub use click::*;
pub use upload::*;
