//! Metrics collection and exposition.
//!
//! # Metrics
//! - `publisher_requests_total` (counter): handled requests by outcome, status
//! - `publisher_request_duration_seconds` (histogram): handler latency
//! - `publisher_downstream_failures_total` (counter): stream API failures by kind
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

/// Record one handled request.
pub fn record_request(outcome: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "publisher_requests_total",
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("publisher_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record a failed call to the stream API.
pub fn record_downstream_failure(kind: &'static str) {
    metrics::counter!("publisher_downstream_failures_total", "kind" => kind).increment(1);
}
