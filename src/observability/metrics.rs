//! Metrics collection and exposition.
//!
//! # Metrics
//! - `trellis_requests_total` (counter): requests by method, status, route
//! - `trellis_request_duration_seconds` (histogram): latency distribution
//! - `trellis_dispatch_failures_total` (counter): recovered failures by kind
//!   (`error`, `render`, `panic`)
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Route label is the route name, `none` when nothing matched

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Record one finished request.
pub fn record_request(method: &str, status: u16, route: &str, start_time: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("route", route.to_string()),
    ];
    ::metrics::counter!("trellis_requests_total", &labels).increment(1);
    ::metrics::histogram!("trellis_request_duration_seconds", &labels)
        .record(start_time.elapsed().as_secs_f64());
}

/// Record a request that ended in the recovery boundary.
pub fn record_dispatch_failure(kind: &'static str) {
    ::metrics::counter!("trellis_dispatch_failures_total", "kind" => kind).increment(1);
}

/// Install the Prometheus exporter with its own scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}
