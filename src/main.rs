//! siteguard server.
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id / trace / timeout / body limit
//!                       │
//!                       ▼
//!                  security headers ──▶ throttle (/api/*) ──▶ handler
//!                                          │
//!                                          └─ 429 + Retry-After when denied
//! ```

use clap::Parser;
use std::path::PathBuf;

use siteguard::config::{load_config, with_bind_override, AppConfig};
use siteguard::lifecycle::{self, signals, Shutdown};
use siteguard::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "siteguard")]
#[command(about = "Throttled, header-hardened front for the web application")]
struct Args {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    let config = with_bind_override(config, args.bind)?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!("siteguard v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_requests = config.throttle.max_requests,
        window_ms = config.throttle.window_ms,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    signals::forward_signals(shutdown.clone());

    if let Err(e) = lifecycle::start(config, shutdown).await {
        tracing::error!(error = %e, "Startup failed");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
