//! Common test utilities and helpers.

#![allow(dead_code)]

use relay_gateway::{
    config::{
        AuthConfig, Config, DownstreamConfig, LoggingConfig, NotifyConfig, ServerConfig,
    },
    create_router, AppState, ErrorMode, ForwardPolicy,
};
use std::net::TcpListener;
use std::time::Duration;
use tokio::net::TcpListener as TokioTcpListener;

/// Key callers must present to the gateway
pub const API_KEY: &str = "test-gateway-key";

/// Key the gateway presents to the downstream service
pub const DOWNSTREAM_KEY: &str = "test-downstream-key";

/// Bot token used against the mocked Telegram API
pub const BOT_TOKEN: &str = "123456:test-token";

/// Chat receiving notifications
pub const CHAT_ID: &str = "-100200300";

/// Test server instance
pub struct TestServer {
    pub public_url: String,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Start a gateway relaying to `downstream_url` and notifying via `telegram_url`
    pub async fn start(downstream_url: &str, telegram_url: &str) -> Self {
        Self::start_with_config(create_test_config(downstream_url, telegram_url)).await
    }

    /// Start a gateway with a specific error translation mode
    pub async fn start_with_mode(downstream_url: &str, mode: ErrorMode) -> Self {
        let mut config = create_test_config(downstream_url, "http://127.0.0.1:9");
        config.policy.error_mode = mode;
        Self::start_with_config(config).await
    }

    /// Start a gateway from a full configuration
    pub async fn start_with_config(mut config: Config) -> Self {
        let port = get_available_port();
        config.server.port = port;

        let public_url = format!("http://127.0.0.1:{}", port);

        let state = AppState::new(config).expect("Failed to create app state");
        let app = create_router(state);

        let addr: std::net::SocketAddr = format!("127.0.0.1:{}", port).parse().unwrap();
        let listener = TokioTcpListener::bind(addr)
            .await
            .expect("Failed to bind listener");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        // Start server in background
        tokio::spawn(async move {
            tokio::select! {
                _ = axum::serve(listener, app) => {}
                _ = shutdown_rx => {}
            }
        });

        // Give the server time to start
        tokio::time::sleep(Duration::from_millis(50)).await;

        Self {
            public_url,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get HTTP client
    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap()
    }

    /// Get URL for a path on the gateway
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.public_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Create test configuration
pub fn create_test_config(downstream_url: &str, telegram_url: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            max_body_size: 1024 * 1024,
        },
        auth: AuthConfig {
            api_key: API_KEY.to_string(),
        },
        downstream: DownstreamConfig {
            base_url: downstream_url.to_string(),
            api_key: DOWNSTREAM_KEY.to_string(),
            timeout_seconds: 1,
        },
        notify: NotifyConfig {
            api_base: telegram_url.to_string(),
            bot_token: BOT_TOKEN.to_string(),
            chat_id: CHAT_ID.to_string(),
            timeout_seconds: 1,
        },
        policy: ForwardPolicy::default(),
        logging: LoggingConfig {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        },
    }
}

/// Find an available TCP port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind to random port")
        .local_addr()
        .expect("Failed to get local address")
        .port()
}

/// URL of a local port nothing listens on
pub fn unreachable_url() -> String {
    format!("http://127.0.0.1:{}", get_available_port())
}

/// Build a single-file multipart form
pub fn file_form(filename: &str, content: &[u8], mime: &str) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(content.to_vec())
            .file_name(filename.to_string())
            .mime_str(mime)
            .unwrap(),
    )
}
