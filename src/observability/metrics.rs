//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_dispatch_total` (counter): dispatches by route and status
//! - `gateway_dispatch_duration_seconds` (histogram): dispatch latency by route
//! - `gateway_fallback_total` (counter): payloads no classifier accepted
//! - `gateway_handler_errors_total` (counter): inner handler failures by route
//!
//! Without an installed recorder every call is a no-op, which is the case
//! under Lambda.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with its own scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_dispatch(route: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "gateway_dispatch_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_dispatch_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_fallback() {
    metrics::counter!("gateway_fallback_total").increment(1);
}

pub fn record_handler_error(route: &'static str) {
    metrics::counter!("gateway_handler_errors_total", "route" => route).increment(1);
}
