//! Metrics collection and exposition.
//!
//! # Metrics
//! - `arkr_resolutions_total` (counter): resolution attempts by outcome
//! - `arkr_resolution_duration_seconds` (histogram): time spent resolving
//! - `arkr_listing_requests_total` (counter): listing requests by format

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of one resolution.
pub fn record_resolution(outcome: &'static str, start: Instant) {
    counter!("arkr_resolutions_total", "outcome" => outcome).increment(1);
    histogram!("arkr_resolution_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record a listing request served in `format`.
pub fn record_listing(format: &'static str) {
    counter!("arkr_listing_requests_total", "format" => format).increment(1);
}
