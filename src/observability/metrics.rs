//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by endpoint, status
//! - `gateway_request_duration_seconds` (histogram): latency by endpoint
//! - `gateway_rate_limited_total` (counter): rejected callers
//! - `gateway_rate_limit_tracked_clients` (gauge): live rate-limit records
//! - `gateway_transactions_total` (counter): poll outcomes
//! - `gateway_confirmation_rounds` (histogram): rounds polled per transfer
//! - `gateway_node_errors_total` (counter): adapter failures by operation
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, so tests need no setup
//! - Prometheus exposition is opt-in via config

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed HTTP request.
pub fn record_request(endpoint: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "endpoint" => endpoint,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

/// Record a request rejected by the rate limiter.
pub fn record_rate_limited() {
    metrics::counter!("gateway_rate_limited_total").increment(1);
}

/// Record the number of callers currently tracked by the rate limiter.
pub fn record_tracked_clients(count: usize) {
    metrics::gauge!("gateway_rate_limit_tracked_clients").set(count as f64);
}

/// Record a terminal confirmation outcome ("confirmed", "rejected", "timed_out").
pub fn record_transaction(outcome: &'static str) {
    metrics::counter!("gateway_transactions_total", "outcome" => outcome).increment(1);
}

/// Record how many rounds a transfer was polled for.
pub fn record_confirmation_rounds(rounds: u64) {
    metrics::histogram!("gateway_confirmation_rounds").record(rounds as f64);
}

/// Record a failed node call.
pub fn record_node_error(operation: &'static str) {
    metrics::counter!("gateway_node_errors_total", "operation" => operation).increment(1);
}
