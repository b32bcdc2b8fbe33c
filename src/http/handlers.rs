//! Request handlers.

use axum::{body::Body, extract::State, http::Request, Json};
use serde::Serialize;

use crate::http::server::AppState;
use crate::security::rate_limit::client_identifier;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Quota report for the calling client.
#[derive(Debug, Serialize)]
pub struct QuotaResponse {
    pub limit: u32,
    pub remaining: u32,
    pub window_ms: u64,
}

pub async fn index() -> &'static str {
    "siteguard is running\n"
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Read-only: reporting quota never admits a request on its own.
pub async fn quota(State(state): State<AppState>, request: Request<Body>) -> Json<QuotaResponse> {
    let client = client_identifier(&request);
    let policy = state.policy;
    let remaining = state
        .throttle
        .remaining_quota(&client, policy.max_requests, policy.window);

    Json(QuotaResponse {
        limit: policy.max_requests,
        remaining,
        window_ms: u64::try_from(policy.window.as_millis()).unwrap_or(u64::MAX),
    })
}
