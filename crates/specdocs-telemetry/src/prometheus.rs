//! Prometheus text exposition format rendering.
//!
//! Served at `/metrics`.

use crate::MetricsRegistry;
use prometheus_client::encoding::text::encode;

/// Content-Type header value for Prometheus text format.
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render the metrics registry to Prometheus text format.
pub fn render_metrics(registry: &MetricsRegistry) -> String {
    let mut buffer = String::new();
    if let Err(e) = encode(&mut buffer, &registry.registry) {
        tracing::error!(error = %e, "failed to encode metrics");
    }
    buffer
}
