//! `relay-gateway` binary.
//!
//! Reads `config.local.toml` or `config.toml` from the working directory
//! (defaults when neither exists), then applies the `GATEWAY_*`,
//! `DOWNSTREAM_*`, `TELEGRAM_*` and `FORWARD_ERROR_MODE` environment
//! overrides. `RUST_LOG` takes precedence over `logging.level`.
//!
//! An invalid configuration aborts startup before the listener is bound.

use relay_gateway::config::{Config, LoggingConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default()?;
    init_tracing(&config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        "Starting relay gateway"
    );

    relay_gateway::run(config).await
}

/// Install the global subscriber, `json` or human-readable output
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let json = logging.format.eq_ignore_ascii_case("json");

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(|| fmt::layer().pretty()))
        .try_init()?;

    Ok(())
}
