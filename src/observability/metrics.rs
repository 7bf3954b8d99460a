//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_invocations_total` (counter): invocations by capability, kind, outcome
//! - `gateway_invocation_duration_seconds` (histogram): backend round-trip per capability
//! - `gateway_passthrough_requests_total` (counter): native requests by method, status
//! - `gateway_capabilities` (gauge): exposed capabilities by kind, plus excluded routes
//!
//! # Design Decisions
//! - Uses the `metrics` facade; recording is a no-op until an exporter is installed
//! - Prometheus exporter runs its own listener, separate from the gateway port

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::routing::classifier::CapabilityKind;
use crate::routing::table::CapabilityTable;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one capability invocation.
pub fn record_invocation(capability: &str, kind: CapabilityKind, outcome: &'static str, start: Instant) {
    metrics::counter!(
        "gateway_invocations_total",
        "capability" => capability.to_string(),
        "kind" => kind.as_str(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!(
        "gateway_invocation_duration_seconds",
        "capability" => capability.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record one native passthrough request.
pub fn record_passthrough(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "gateway_passthrough_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_passthrough_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

/// Publish the size of the capability table.
pub fn record_table(table: &CapabilityTable) {
    for kind in [
        CapabilityKind::Action,
        CapabilityKind::Resource,
        CapabilityKind::TemplatedResource,
    ] {
        metrics::gauge!("gateway_capabilities", "kind" => kind.as_str())
            .set(table.of_kind(kind).count() as f64);
    }
    metrics::gauge!("gateway_capabilities", "kind" => "excluded").set(table.excluded().len() as f64);
}
