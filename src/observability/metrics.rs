//! Metrics collection and exposition.
//!
//! # Metrics
//! - `folder_router_mounted_units` (gauge): units mounted at startup
//! - `folder_router_skipped_directories` (gauge): directories without a mount
//! - `folder_router_failed_directories` (gauge): directories with a load error
//! - `folder_router_requests_total` (counter): requests by method, status
//! - `folder_router_request_duration_seconds` (histogram): latency distribution
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::lifecycle::startup::BootstrapSummary;

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_bootstrap(summary: &BootstrapSummary) {
    metrics::gauge!("folder_router_mounted_units").set(summary.mounted as f64);
    metrics::gauge!("folder_router_skipped_directories").set(summary.skipped() as f64);
    metrics::gauge!("folder_router_failed_directories").set(summary.failed as f64);
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let status = status.to_string();
    metrics::counter!(
        "folder_router_requests_total",
        "method" => method.to_string(),
        "status" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        "folder_router_request_duration_seconds",
        "method" => method.to_string(),
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

/// Middleware recording request count and latency.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().as_str().to_owned();
    let response = next.run(request).await;
    record_request(&method, response.status().as_u16(), start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_gauges_reach_the_recorder() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        let summary = BootstrapSummary {
            mounted: 3,
            no_router: 2,
            failed: 1,
        };
        metrics::with_local_recorder(&recorder, || record_bootstrap(&summary));

        let rendered = handle.render();
        assert!(rendered.contains("# TYPE folder_router_mounted_units gauge"), "{rendered}");
        assert!(rendered.contains("folder_router_skipped_directories"), "{rendered}");
        assert!(rendered.contains("folder_router_failed_directories"), "{rendered}");
    }
}
