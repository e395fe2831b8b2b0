//! Prometheus metrics recorder and `/metrics` rendering.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Must be called once at startup, before any metrics are recorded.
pub fn install_recorder() -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install metrics recorder");
    info!("prometheus metrics recorder installed");
    handle
}

// Metric name constants to avoid typos across crates.

/// WebSocket connections opened total (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// WebSocket disconnections total (counter).
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// Refused connection attempts (counter).
pub const WS_CONNECTIONS_REFUSED_TOTAL: &str = "ws_connections_refused_total";
/// Live sessions in the registry (gauge, owned by insight-notify).
pub const NOTIFY_SESSIONS_ACTIVE: &str = "notify_sessions_active";
/// Successful payload pushes (counter, owned by insight-notify).
pub const NOTIFY_DELIVERIES_TOTAL: &str = "notify_deliveries_total";
/// Failed payload pushes (counter, owned by insight-notify).
pub const NOTIFY_DELIVERY_FAILURES_TOTAL: &str = "notify_delivery_failures_total";
/// Sessions reaped after a failed push (counter, owned by insight-notify).
pub const NOTIFY_SESSIONS_REAPED_TOTAL: &str = "notify_sessions_reaped_total";
