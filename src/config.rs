//! Configuration module for the relay gateway.
//!
//! Configuration is read once at startup and is immutable afterwards. It is
//! assembled from a TOML file and then overridden by environment variables,
//! which is how the secrets are normally supplied in deployment.
//!
//! # Configuration Sources (in order of priority)
//! 1. Environment variables (see [`ENV_OVERRIDES`])
//! 2. `config.local.toml` - Local overrides (gitignored)
//! 3. `config.toml` - Main configuration file
//! 4. Default values
//!
//! # Example
//! ```rust,ignore
//! let config = Config::load("config.toml")?;
//! println!("Forwarding uploads to {}", config.downstream.base_url);
//! ```

use reqwest::Url;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::policy::{ErrorMode, ForwardPolicy};

/// Environment variables recognised by [`Config::apply_overrides`].
pub const ENV_OVERRIDES: &[&str] = &[
    "GATEWAY_HOST",
    "GATEWAY_PORT",
    "GATEWAY_API_KEY",
    "DOWNSTREAM_URL",
    "DOWNSTREAM_API_KEY",
    "TELEGRAM_BOT_TOKEN",
    "TELEGRAM_CHAT_ID",
    "FORWARD_ERROR_MODE",
];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub downstream: DownstreamConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub policy: ForwardPolicy,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Maximum accepted request body in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_body_size: 10 * 1024 * 1024,
        }
    }
}

/// Inbound authentication
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Shared secret expected in the `x-api-key` header
    #[serde(default)]
    pub api_key: String,
}

/// Downstream file service that uploads are relayed to
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownstreamConfig {
    /// Base URL, without trailing slash. Uploads go to `{base_url}/file/{username}`.
    pub base_url: String,
    /// Key sent to the downstream service as `x-api-key`
    pub api_key: String,
    /// Outbound request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            timeout_seconds: 30,
        }
    }
}

impl DownstreamConfig {
    /// Full URL an upload for `username` is forwarded to
    ///
    /// `username` always lands in a single path segment: `/`, `?`, `#` and `%`
    /// are percent-encoded. Returns `None` if `base_url` is not a usable base.
    pub fn file_url(&self, username: &str) -> Option<Url> {
        let mut url = Url::parse(&self.base_url).ok()?;
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .push("file")
            .push(username);
        Some(url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Telegram Bot API settings for click notifications
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Bot API base URL, without trailing slash
    pub api_base: String,
    /// Bot token
    pub bot_token: String,
    /// Chat or channel that receives the notifications
    pub chat_id: String,
    /// Outbound request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".to_string(),
            bot_token: String::new(),
            chat_id: String::new(),
            timeout_seconds: 10,
        }
    }
}

impl NotifyConfig {
    /// Whether both the token and the chat id are present
    pub fn is_configured(&self) -> bool {
        !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }

    /// `sendMessage` endpoint for the configured bot
    pub fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file path, then apply environment overrides
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read or parsed, or if the
    /// resulting configuration is invalid
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.finish()
    }

    /// Load configuration from default locations
    ///
    /// Tries to load from:
    /// 1. `config.local.toml` (if exists)
    /// 2. `config.toml` (if exists)
    /// 3. built-in defaults, so a deployment can be configured by environment alone
    pub fn load_default() -> Result<Self, ConfigError> {
        // Try local config first
        if Path::new("config.local.toml").exists() {
            return Self::load("config.local.toml");
        }

        if Path::new("config.toml").exists() {
            return Self::load("config.toml");
        }

        Config::default().finish()
    }

    fn finish(mut self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())?;
        self.validate()?;
        Ok(self)
    }

    /// Apply overrides from a key lookup (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("GATEWAY_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("GATEWAY_PORT") {
            self.server.port = port.parse().map_err(|_| {
                ConfigError::ValidationError(format!("GATEWAY_PORT is not a valid port: {}", port))
            })?;
        }
        if let Some(key) = lookup("GATEWAY_API_KEY") {
            self.auth.api_key = key;
        }
        if let Some(url) = lookup("DOWNSTREAM_URL") {
            self.downstream.base_url = url;
        }
        if let Some(key) = lookup("DOWNSTREAM_API_KEY") {
            self.downstream.api_key = key;
        }
        if let Some(token) = lookup("TELEGRAM_BOT_TOKEN") {
            self.notify.bot_token = token;
        }
        if let Some(chat_id) = lookup("TELEGRAM_CHAT_ID") {
            self.notify.chat_id = chat_id;
        }
        if let Some(mode) = lookup("FORWARD_ERROR_MODE") {
            self.policy.error_mode = mode
                .parse::<ErrorMode>()
                .map_err(ConfigError::ValidationError)?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.api_key.is_empty() {
            return Err(ConfigError::ValidationError(
                "auth.api_key must be set (or GATEWAY_API_KEY)".to_string(),
            ));
        }

        if self.downstream.base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "downstream.base_url must be set (or DOWNSTREAM_URL)".to_string(),
            ));
        }

        let parsed = Url::parse(&self.downstream.base_url).ok();
        if !matches!(parsed.as_ref().map(Url::scheme), Some("http") | Some("https"))
            || parsed.as_ref().is_some_and(Url::cannot_be_a_base)
        {
            return Err(ConfigError::ValidationError(
                "downstream.base_url must be an http(s) URL".to_string(),
            ));
        }

        if self.downstream.base_url.ends_with('/') || self.notify.api_base.ends_with('/') {
            return Err(ConfigError::ValidationError(
                "base URLs should not have a trailing slash".to_string(),
            ));
        }

        if self.downstream.timeout_seconds == 0 || self.notify.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.policy.allowed_extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "policy.allowed_extensions must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
