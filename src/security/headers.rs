//! Security response headers.
//!
//! # Responsibilities
//! - Add X-Frame-Options, X-Content-Type-Options, Referrer-Policy and
//!   Permissions-Policy to page responses
//! - Skip requests whose path is on the exclusion list
//!
//! # Design Decisions
//! - Exclusions are prefixes of the path after its leading `/`, so `api`
//!   covers `/api`, `/api/health` and `/apiary` alike
//! - Headers are set after the handler runs and overwrite handler values

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{HeaderName, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS},
        HeaderMap, HeaderValue, Request,
    },
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::config::SecurityConfig;

pub const PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");

/// The fixed header set attached to every non-excluded response.
pub fn security_headers() -> [(HeaderName, HeaderValue); 4] {
    [
        (X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
        (X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (
            REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ),
        (
            PERMISSIONS_POLICY,
            HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
        ),
    ]
}

/// Set every security header on `headers`.
pub fn apply_security_headers(headers: &mut HeaderMap) {
    for (name, value) in security_headers() {
        headers.insert(name, value);
    }
}

/// Paths the header middleware leaves alone.
#[derive(Debug, Clone, Default)]
pub struct PathExclusions {
    prefixes: Vec<String>,
}

impl PathExclusions {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(|p| p.into().trim_start_matches('/').to_string())
                .collect(),
        }
    }

    /// True when `path` (minus its leading `/`) starts with any excluded prefix.
    pub fn is_excluded(&self, path: &str) -> bool {
        let relative = path.strip_prefix('/').unwrap_or(path);
        self.prefixes.iter().any(|p| relative.starts_with(p.as_str()))
    }
}

/// State for [`security_headers_middleware`].
#[derive(Debug, Clone)]
pub struct SecurityHeadersState {
    pub enabled: bool,
    pub exclusions: Arc<PathExclusions>,
}

impl SecurityHeadersState {
    pub fn from_config(config: &SecurityConfig) -> Self {
        Self {
            enabled: config.enable_headers,
            exclusions: Arc::new(PathExclusions::new(config.excluded_prefixes.iter().cloned())),
        }
    }
}

pub async fn security_headers_middleware(
    State(state): State<SecurityHeadersState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let skip = !state.enabled || state.exclusions.is_excluded(request.uri().path());

    let mut response = next.run(request).await;
    if !skip {
        apply_security_headers(response.headers_mut());
    }
    response
}
