//! Request throttling middleware.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header::RETRY_AFTER, HeaderMap, HeaderName, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::ThrottleConfig;
use crate::observability::metrics;
use crate::throttle::{RequestThrottle, ThrottlePolicy};

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// State for the throttle middleware.
#[derive(Debug, Clone)]
pub struct ThrottleState {
    pub throttle: RequestThrottle,
    pub policy: ThrottlePolicy,
    pub enabled: bool,
    /// Path prefixes that count against the quota.
    pub protected_prefixes: Arc<Vec<String>>,
}

impl ThrottleState {
    pub fn new(throttle: RequestThrottle, config: &ThrottleConfig) -> Self {
        Self {
            throttle,
            policy: config.policy(),
            enabled: config.enabled,
            protected_prefixes: Arc::new(config.protected_prefixes.clone()),
        }
    }

    fn protects(&self, path: &str) -> bool {
        self.enabled
            && self
                .protected_prefixes
                .iter()
                .any(|p| path.starts_with(p.as_str()))
    }
}

/// Identifier a request is throttled under: the peer IP.
pub fn client_identifier<B>(request: &Request<B>) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn set_quota_headers(headers: &mut HeaderMap, limit: u32, remaining: u32) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(remaining));
}

/// Admit the request against the caller's quota or answer 429.
pub async fn throttle_middleware(
    State(state): State<ThrottleState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.protects(request.uri().path()) {
        return next.run(request).await;
    }

    let client = client_identifier(&request);
    let ThrottlePolicy {
        max_requests,
        window,
    } = state.policy;

    let admission = state.throttle.check(&client, max_requests, window);
    metrics::record_throttle_decision(admission.allowed, state.throttle.len());

    if !admission.allowed {
        let wait = state.throttle.retry_after(&client, window).unwrap_or(window);
        let wait_secs = u64::try_from(wait.as_millis().div_ceil(1000)).unwrap_or(u64::MAX);
        tracing::warn!(client = %client, retry_after_secs = wait_secs, "Rate limit exceeded");

        let mut response = (StatusCode::TOO_MANY_REQUESTS, "Too many requests").into_response();
        let headers = response.headers_mut();
        headers.insert(RETRY_AFTER, HeaderValue::from(wait_secs));
        set_quota_headers(headers, max_requests, 0);
        return response;
    }

    let remaining = admission.remaining;
    tracing::debug!(client = %client, remaining, "Request admitted");

    let mut response = next.run(request).await;
    set_quota_headers(response.headers_mut(), max_requests, remaining);
    response
}
