//! Metrics collection and exposition.
//!
//! # Metrics
//! - `siteguard_throttle_decisions_total` (counter): admissions by `decision`
//! - `siteguard_throttle_swept_total` (counter): identifiers removed by sweeps
//! - `siteguard_throttle_identifiers` (gauge): identifiers currently tracked,
//!   updated on every throttled request and every sweep
//!
//! Without an installed recorder every call is a no-op.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one admission decision and the registry size after it.
pub fn record_throttle_decision(allowed: bool, tracked: usize) {
    let decision = if allowed { "allowed" } else { "denied" };
    counter!("siteguard_throttle_decisions_total", "decision" => decision).increment(1);
    record_tracked_identifiers(tracked);
}

/// Record the outcome of a sweep.
pub fn record_sweep(removed: usize, remaining: usize) {
    counter!("siteguard_throttle_swept_total").increment(removed as u64);
    record_tracked_identifiers(remaining);
}

fn record_tracked_identifiers(tracked: usize) {
    gauge!("siteguard_throttle_identifiers").set(tracked as f64);
}
