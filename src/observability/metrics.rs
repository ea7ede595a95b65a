//! Metrics collection and exposition.
//!
//! # Metrics
//! - `normalizer_requests_total` (counter): normalized requests by `proxied`, `multipart`
//! - `normalizer_overrides_total` (counter): applied overrides by `kind`
//! - `normalizer_rejections_total` (counter): rejected requests by `reason`
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Count a successfully normalized request.
pub fn record_normalized(proxied: bool, multipart: bool, overrides: &[&'static str]) {
    metrics::counter!(
        "normalizer_requests_total",
        "proxied" => flag(proxied),
        "multipart" => flag(multipart)
    )
    .increment(1);

    for kind in overrides {
        metrics::counter!("normalizer_overrides_total", "kind" => *kind).increment(1);
    }
}

/// Count a rejected request.
pub fn record_rejected(reason: &'static str) {
    metrics::counter!("normalizer_rejections_total", "reason" => reason).increment(1);
}
