//! Metrics collection and exposition.
//!
//! # Metrics
//! - `palm_provider_requests_total` (counter): provider calls by method, outcome
//! - `palm_chain_observations_total` (counter): chain observations by source
//! - `palm_transactions_submitted_total` (counter): accepted contract calls by method
//! - `palm_active_chain_id` (gauge): last observed chain id
//! - `palm_event_stream_reconnects_total` (counter): bridge event stream reconnect attempts
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_provider_request(method: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("palm_provider_requests_total", "method" => method, "outcome" => outcome).increment(1);
}

pub fn record_chain_observation(source: &'static str, chain_id: u64) {
    counter!("palm_chain_observations_total", "source" => source).increment(1);
    gauge!("palm_active_chain_id").set(chain_id as f64);
}

pub fn record_transaction_submitted(method: &'static str) {
    counter!("palm_transactions_submitted_total", "method" => method).increment(1);
}

pub fn record_event_stream_reconnect() {
    counter!("palm_event_stream_reconnects_total").increment(1);
}
