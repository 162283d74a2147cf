//! Metrics collection and exposition.
//!
//! # Metrics
//! - `flow_router_transitions_total` (counter): completed enter/leave
//!   transitions by kind and flow
//! - `flow_router_navigations_total` (counter): finished requests by result
//! - `flow_router_navigation_duration_seconds` (histogram): request latency,
//!   including presentation time
//! - `flow_router_tree_nodes` (gauge): routables registered in the tree
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, so library users and tests pay nothing
//! - The Prometheus exporter is opt-in through config

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::routing::RoutingIdentifier;

/// Record a finished enter or leave transition of `flow`.
pub fn record_transition(kind: &'static str, flow: &RoutingIdentifier) {
    ::metrics::counter!(
        "flow_router_transitions_total",
        "kind" => kind,
        "flow" => flow.to_string()
    )
    .increment(1);
}

/// Record a finished navigation request.
pub fn record_navigation(result: &'static str, start_time: Instant) {
    ::metrics::counter!("flow_router_navigations_total", "result" => result).increment(1);
    ::metrics::histogram!("flow_router_navigation_duration_seconds")
        .record(start_time.elapsed().as_secs_f64());
}

pub fn record_tree_size(nodes: usize) {
    ::metrics::gauge!("flow_router_tree_nodes").set(nodes as f64);
}

/// Install the Prometheus exporter with an HTTP scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}
