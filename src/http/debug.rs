//! Built-in debug server.
//!
//! Serves `GET /healthz` and `GET /metrics` (Prometheus text format) on the
//! configured debug port. Registered by the runtime like any other server.

use axum::{extract::State, routing::get, Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::DebugConfig;
use crate::error::FatalError;
use crate::http::HttpServer;
use crate::observability::metrics;

/// Build the debug router around an installed recorder.
pub fn debug_router(recorder: PrometheusHandle) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(render_metrics))
        .with_state(recorder)
}

/// Create the debug server, installing the metrics recorder if needed.
pub fn debug_server(config: &DebugConfig) -> Result<HttpServer, FatalError> {
    let recorder = metrics::install()?;
    Ok(HttpServer::new(config.address(), debug_router(recorder)))
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn render_metrics(State(recorder): State<PrometheusHandle>) -> String {
    recorder.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn healthz_reports_ok() {
        let app = debug_router(metrics::install().unwrap());
        let response = app
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn metrics_renders_prometheus_text() {
        let app = debug_router(metrics::install().unwrap());
        metrics::server_started();
        metrics::server_stopped();

        let response = app
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1 << 20).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("runtime_servers_running"));
    }

    #[test]
    fn debug_server_uses_configured_address() {
        let config = DebugConfig {
            enabled: true,
            host: "127.0.0.1".into(),
            port: 6061,
        };
        let server = debug_server(&config).unwrap();
        assert_eq!(crate::net::Listener::addr(&server), "127.0.0.1:6061");
    }
}
