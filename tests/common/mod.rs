//! Shared utilities for runtime integration tests.

use axum::{routing::get, Router};
use service_runtime::{FatalError, Runtime, RuntimeConfig};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Default config with the debug server disabled.
#[allow(dead_code)]
pub fn quiet_config() -> RuntimeConfig {
    let mut config = RuntimeConfig::default();
    config.debug.enabled = false;
    config
}

/// Router answering `GET /` with "hello" and `GET /slow` after `delay`.
pub fn hello_router(delay: Duration) -> Router {
    Router::new()
        .route("/", get(|| async { "hello" }))
        .route(
            "/slow",
            get(move || async move {
                tokio::time::sleep(delay).await;
                "finally"
            }),
        )
}

/// Start the runtime on a task; sending on the returned channel terminates it.
pub fn spawn_runtime(
    runtime: Runtime,
) -> (oneshot::Sender<()>, JoinHandle<Result<(), FatalError>>) {
    let (trigger, triggered) = oneshot::channel::<()>();
    let handle = tokio::spawn(runtime.run_until(async {
        let _ = triggered.await;
    }));
    (trigger, handle)
}

/// Wait until `addr` accepts TCP connections.
pub async fn wait_until_reachable(addr: SocketAddr) {
    for _ in 0..100 {
        if TcpStream::connect(addr).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("{addr} never became reachable");
}

/// True once `addr` refuses connections.
#[allow(dead_code)]
pub async fn is_refused(addr: SocketAddr) -> bool {
    TcpStream::connect(addr).await.is_err()
}
