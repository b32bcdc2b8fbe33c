//! Startup orchestration.

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{validate_env, AppConfig, EnvError};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::throttle::{RequestThrottle, Sweeper};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Env(#[from] EnvError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Validate the environment, bind, and serve until `shutdown` fires.
pub async fn start(config: AppConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    validate_env()?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    serve(listener, config, RequestThrottle::new(), shutdown).await
}

/// Serve on an already bound listener. Skips environment validation.
pub async fn serve(
    listener: TcpListener,
    config: AppConfig,
    throttle: RequestThrottle,
    shutdown: Shutdown,
) -> Result<(), StartupError> {
    let sweep_secs = config.throttle.sweep_interval_secs;
    let sweeper = if sweep_secs > 0 {
        let sweeper = Sweeper::new(
            throttle.clone(),
            Duration::from_millis(config.throttle.window_ms),
            Duration::from_secs(sweep_secs),
        );
        Some(tokio::spawn(sweeper.run(shutdown.subscribe())))
    } else {
        tracing::info!("Throttle sweeping disabled; registry grows with distinct clients");
        None
    };

    let server = HttpServer::with_throttle(config, throttle);
    let result = server.run(listener, shutdown.subscribe()).await;

    shutdown.trigger();
    if let Some(handle) = sweeper {
        let _ = handle.await;
    }

    result.map_err(StartupError::from)
}
