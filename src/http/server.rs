//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit,
//!   security headers, throttling)
//! - Bind server to listener and stop on the shutdown signal

use axum::{middleware, routing::get, Router};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::http::handlers;
use crate::lifecycle::shutdown;
use crate::security::{
    security_headers_middleware, throttle_middleware, SecurityHeadersState, ThrottleState,
};
use crate::throttle::{RequestThrottle, ThrottlePolicy};

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub throttle: RequestThrottle,
    pub policy: ThrottlePolicy,
}

/// The HTTP server.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    throttle: RequestThrottle,
}

impl HttpServer {
    /// Create a server with its own throttle registry.
    pub fn new(config: AppConfig) -> Self {
        Self::with_throttle(config, RequestThrottle::new())
    }

    /// Create a server sharing `throttle` with the caller.
    pub fn with_throttle(config: AppConfig, throttle: RequestThrottle) -> Self {
        let router = Self::build_router(&config, throttle.clone());
        Self {
            router,
            config,
            throttle,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, throttle: RequestThrottle) -> Router {
        let state = AppState {
            throttle: throttle.clone(),
            policy: config.throttle.policy(),
        };
        let throttle_state = ThrottleState::new(throttle, &config.throttle);
        let headers_state = SecurityHeadersState::from_config(&config.security);

        // Reading the quota must not spend it.
        let throttled = Router::new()
            .route("/api/health", get(handlers::health))
            .route_layer(middleware::from_fn_with_state(
                throttle_state,
                throttle_middleware,
            ));

        Router::new()
            .route("/", get(handlers::index))
            .route("/api/quota", get(handlers::quota))
            .merge(throttled)
            .with_state(state)
            .layer(middleware::from_fn_with_state(
                headers_state,
                security_headers_middleware,
            ))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The registry this server admits against.
    pub fn throttle(&self) -> &RequestThrottle {
        &self.throttle
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            throttle_enabled = self.config.throttle.enabled,
            max_requests = self.config.throttle.max_requests,
            window_ms = self.config.throttle.window_ms,
            "HTTP server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        extract::ConnectInfo,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn request(uri: &str) -> Request<Body> {
        let mut request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let peer: SocketAddr = "192.0.2.1:4000".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));
        request
    }

    #[tokio::test]
    async fn test_router_assigns_request_id() {
        let server = HttpServer::new(AppConfig::default());
        let res = server.router().oneshot(request("/")).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key("x-request-id"));
        assert_eq!(res.headers()["x-frame-options"], "DENY");
    }

    #[tokio::test]
    async fn test_quota_endpoint_does_not_spend_quota() {
        let mut config = AppConfig::default();
        config.throttle.max_requests = 5;
        let server = HttpServer::new(config);

        for _ in 0..3 {
            let res = server.router().oneshot(request("/api/quota")).await.unwrap();
            assert_eq!(res.status(), StatusCode::OK);
            assert!(res.headers().get("x-frame-options").is_none());
            assert!(res.headers().get("x-ratelimit-limit").is_none());

            let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["limit"], 5);
            assert_eq!(json["remaining"], 5);
        }
        assert!(server.throttle().is_empty());
    }

    #[tokio::test]
    async fn test_quota_endpoint_answers_when_exhausted() {
        let mut config = AppConfig::default();
        config.throttle.max_requests = 2;
        let server = HttpServer::new(config);

        for _ in 0..2 {
            let res = server.router().oneshot(request("/api/health")).await.unwrap();
            assert_eq!(res.status(), StatusCode::OK);
        }
        let denied = server.router().oneshot(request("/api/health")).await.unwrap();
        assert_eq!(denied.status(), StatusCode::TOO_MANY_REQUESTS);

        let res = server.router().oneshot(request("/api/quota")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["remaining"], 0);
        assert_eq!(
            server.throttle().remaining_quota("192.0.2.1", 2, Duration::from_secs(60)),
            0
        );
    }
}
