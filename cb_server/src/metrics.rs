//! Prometheus metrics.
//!
//! Counters are recorded unconditionally; they only reach Prometheus once
//! [`init_metrics`] has installed the exporter.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter, serving `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

/// Record an HTTP request with method, route and status labels.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

/// Record a generated bracket by size.
pub fn brackets_created_total(bracket_size: u32) {
    metrics::counter!("brackets_created_total",
        "size" => bracket_size.to_string()
    )
    .increment(1);
}

/// Record a match result by the status it was saved with.
pub fn matches_recorded_total(status: &str) {
    metrics::counter!("matches_recorded_total",
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a finished bracket.
pub fn brackets_completed_total() {
    metrics::counter!("brackets_completed_total").increment(1);
}
