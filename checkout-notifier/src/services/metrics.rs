//! Metrics collection for checkout-notifier.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::OnceLock;
use std::time::Duration;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder. Call once at startup.
pub fn init_metrics() -> Result<(), AppError> {
    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        AppError::InternalError(anyhow::anyhow!("failed to install Prometheus recorder: {}", e))
    })?;

    METRICS_HANDLE
        .set(handle)
        .map_err(|_| AppError::InternalError(anyhow::anyhow!("metrics already initialized")))
}

/// Metrics in Prometheus text format, `None` before [`init_metrics`].
pub fn get_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

/// Count a handled notification by outcome (`ok` / `error`).
pub fn record_notification(status: &str) {
    counter!("checkout_notifications_total", "status" => status.to_string()).increment(1);
}

pub fn record_send_duration(elapsed: Duration) {
    histogram!("checkout_send_duration_seconds").record(elapsed.as_secs_f64());
}
