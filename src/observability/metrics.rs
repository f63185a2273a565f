//! Metrics collection and exposition.
//!
//! # Metrics
//! - `timeoff_requests_total` (counter): requests by method, route, status
//! - `timeoff_request_duration_seconds` (histogram): timing middleware samples
//! - `timeoff_errors_total` (counter): recorded request errors by kind
//! - `timeoff_stream_bytes_total` (counter): bytes sent by chunked transfers
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until an
//!   exporter is installed
//! - Prometheus exporter is optional and configured at startup

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    metrics::counter!(
        "timeoff_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    tracing::trace!(route = %route, elapsed = ?start.elapsed(), "Request recorded");
}

pub fn record_duration(route: &str, elapsed: Duration) {
    metrics::histogram!("timeoff_request_duration_seconds", "route" => route.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_error(kind: &str) {
    metrics::counter!("timeoff_errors_total", "kind" => kind.to_string()).increment(1);
}

pub fn record_stream_bytes(bytes: usize) {
    metrics::counter!("timeoff_stream_bytes_total").increment(bytes as u64);
}
