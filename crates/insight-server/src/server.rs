//! The notification gateway: shared state, routes, and serving.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use insight_notify::delivery::DeliveryEngine;
use insight_notify::lifecycle::ConnectionLifecycle;
use insight_notify::registry::SessionRegistry;
use insight_notify::router::EventRouter;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::ingest;
use crate::shutdown::ShutdownCoordinator;
use crate::ws;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Connection lifecycle handler (owns the registry).
    pub lifecycle: Arc<ConnectionLifecycle>,
    /// Event routing policy.
    pub router: Arc<EventRouter>,
    /// Gateway configuration.
    pub config: Arc<ServerConfig>,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// When the gateway started.
    pub start_time: Instant,
    /// Prometheus render handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

/// The notification gateway server.
///
/// Constructs the whole subsystem — registry, lifecycle handler, delivery
/// engine, event router — once at startup; the registry lives exactly as
/// long as the gateway.
pub struct NotifyGateway {
    state: AppState,
}

impl NotifyGateway {
    /// Wire up a gateway from configuration.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        let lifecycle = Arc::new(ConnectionLifecycle::new(registry.clone()));
        let delivery = Arc::new(DeliveryEngine::new(registry, lifecycle.clone()));
        let router = Arc::new(EventRouter::new(delivery));
        Self {
            state: AppState {
                lifecycle,
                router,
                config: Arc::new(config),
                shutdown: Arc::new(ShutdownCoordinator::new()),
                start_time: Instant::now(),
                metrics: None,
            },
        }
    }

    /// Attach a Prometheus render handle for `GET /metrics`.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.state.metrics = Some(handle);
        self
    }

    /// The shared handler state.
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The shutdown coordinator.
    #[must_use]
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.state.shutdown
    }

    /// Build the Axum router with all routes.
    #[must_use]
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/ws", get(ws::ws_handler))
            .route("/internal/events", post(ingest::ingest_event))
            .route("/debug/connections", get(diagnostics_handler))
            .route("/metrics", get(metrics_handler))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Bind and serve until shutdown is triggered.
    pub async fn serve(&self) -> std::io::Result<()> {
        let addr = format!("{}:{}", self.state.config.host, self.state.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!(addr = %listener.local_addr()?, "notification gateway listening");

        let token = self.state.shutdown.token();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await
    }
}

/// `GET /health`
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let connections = state.lifecycle.registry().len();
    Json(health::health_check(state.start_time, connections))
}

/// `GET /debug/connections` — registry snapshot for an administrative
/// caller. The external permission layer gates access; the core trusts
/// whoever reached it.
async fn diagnostics_handler(State(state): State<AppState>) -> Response {
    Json(state.lifecycle.diagnostics()).into_response()
}

/// `GET /metrics`
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use insight_core::Role;
    use std::sync::Arc as StdArc;
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    fn gateway() -> NotifyGateway {
        NotifyGateway::new(ServerConfig::default())
    }

    fn connect(
        gw: &NotifyGateway,
        identity: &str,
        role: Option<Role>,
        email: Option<&str>,
    ) -> mpsc::Receiver<StdArc<String>> {
        let (tx, rx) = mpsc::channel(8);
        let _ = gw
            .state()
            .lifecycle
            .connect(identity, role, email.map(str::to_owned), tx)
            .unwrap();
        rx
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_connections() {
        let gw = gateway();
        let _rx = connect(&gw, "u1", Some(Role::Admin), None);

        let resp = gw
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["connections"], 1);
    }

    #[tokio::test]
    async fn diagnostics_lists_sessions() {
        let gw = gateway();
        let _rx = connect(&gw, "m1", Some(Role::Maintainer), Some("m1@example.com"));
        let _rx2 = connect(&gw, "anon", None, None);

        let resp = gw
            .router()
            .oneshot(
                Request::builder()
                    .uri("/debug/connections")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["m1"]["role"], "MAINTAINER");
        assert_eq!(json["m1"]["email"], "m1@example.com");
        assert_eq!(json["m1"]["connected"], true);
        assert_eq!(json["anon"]["role"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn diagnostics_empty_registry() {
        let gw = gateway();
        let resp = gw
            .router()
            .oneshot(
                Request::builder()
                    .uri("/debug/connections")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(resp).await;
        assert_eq!(json, serde_json::json!({}));
    }

    #[tokio::test]
    async fn ingest_fans_out_and_summarizes() {
        let gw = gateway();
        let mut m1 = connect(&gw, "m1", Some(Role::Maintainer), None);
        let mut r1 = connect(&gw, "r1", Some(Role::Reporter), None);

        let event = serde_json::json!({
            "kind": "created",
            "issue_id": 4,
            "title": "broken export",
            "severity": "HIGH",
            "status": "OPEN",
            "actor": {"identity": "r1", "role": "REPORTER", "email": "r1@example.com"}
        });
        let resp = gw
            .router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/internal/events")
                    .header("content-type", "application/json")
                    .body(Body::from(event.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        let summary = body_json(resp).await;
        assert_eq!(summary["attempted"], 1);
        assert_eq!(summary["delivered"], 1);
        assert_eq!(summary["failed"], 0);

        let frame = m1.try_recv().unwrap();
        let payload: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(payload["type"], "issue_created");
        assert_eq!(payload["issue_id"], 4);
        // The creating reporter hears nothing.
        assert!(r1.try_recv().is_err());
    }

    #[tokio::test]
    async fn ingest_counts_skips_and_failures() {
        let gw = gateway();
        // A maintainer whose transport is already gone.
        let (tx, rx) = mpsc::channel(8);
        drop(rx);
        let _ = gw
            .state()
            .lifecycle
            .connect("m1", Some(Role::Maintainer), None, tx)
            .unwrap();

        let event = serde_json::json!({
            "kind": "updated",
            "issue_id": 2,
            "title": "t",
            "severity": "LOW",
            "status": "TRIAGED",
            "reporter": "r9",
            "actor": {"identity": "a1", "role": "ADMIN", "email": "a1@example.com"}
        });
        let resp = gw
            .router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/internal/events")
                    .header("content-type", "application/json")
                    .body(Body::from(event.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        // The fan-out never fails the request, whatever happened inside.
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        let summary = body_json(resp).await;
        assert_eq!(summary["attempted"], 2);
        assert_eq!(summary["skipped"], 1); // r9 not connected
        assert_eq!(summary["failed"], 1); // m1's dead transport
        // The broken session was reaped.
        assert!(gw.state().lifecycle.registry().is_empty());
    }

    #[tokio::test]
    async fn ingest_rejects_malformed_events() {
        let gw = gateway();
        let resp = gw
            .router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/internal/events")
                    .header("content-type", "application/json")
                    .body(Body::from("{\"kind\":\"exploded\"}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn ws_without_upgrade_is_not_found_free() {
        let gw = gateway();
        let resp = gw
            .router()
            .oneshot(
                Request::builder()
                    .uri("/ws?userid=u1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        // Not a 404: the route exists; a plain GET just fails the upgrade.
        assert_ne!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn metrics_unavailable_without_recorder() {
        let gw = gateway();
        let resp = gw
            .router()
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let gw = gateway();
        let resp = gw
            .router()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
