//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ralali_proxy_upstream_requests_total` (counter): upstream searches by
//!   endpoint and the status answered to the client
//! - `ralali_proxy_upstream_duration_seconds` (histogram): upstream latency
//!
//! Recording goes through the `metrics` facade, so it is a no-op until
//! [`init_metrics`] installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

pub const UPSTREAM_REQUESTS_TOTAL: &str = "ralali_proxy_upstream_requests_total";
pub const UPSTREAM_DURATION: &str = "ralali_proxy_upstream_duration_seconds";

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one search forwarded upstream. Requests rejected locally never
/// get here.
pub fn record_upstream(endpoint: &'static str, status: u16, start: Instant) {
    metrics::counter!(UPSTREAM_REQUESTS_TOTAL, "endpoint" => endpoint, "status" => status.to_string())
        .increment(1);
    metrics::histogram!(UPSTREAM_DURATION, "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}
