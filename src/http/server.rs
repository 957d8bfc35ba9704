//! HTTP server supervised by the runtime.
//!
//! # Responsibilities
//! - Bind the declared address and serve an Axum router
//! - Drain gracefully on request, reporting whether the deadline was met
//! - Close immediately when draining takes too long
//!
//! # Design Decisions
//! - `axum_server::Handle` gives both graceful and forceful shutdown
//! - A watch channel publishes serve state so draining can wait on it
//! - Serving after shutdown reports `ServeError::Closed`

use axum::Router;
use futures_util::future::{BoxFuture, FutureExt};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::net::{resolve_addr, Listener, ServeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServeState {
    Idle,
    Serving,
    Stopped,
}

/// An HTTP/1.1 + HTTP/2 server for one address.
pub struct HttpServer {
    addr: String,
    router: Mutex<Option<Router>>,
    handle: axum_server::Handle,
    closing: AtomicBool,
    state: watch::Sender<ServeState>,
}

impl HttpServer {
    /// Create a server for `addr` (e.g. `":8080"` or `"127.0.0.1:8080"`).
    pub fn new(addr: impl Into<String>, router: Router) -> Self {
        let (state, _) = watch::channel(ServeState::Idle);
        Self {
            addr: addr.into(),
            router: Mutex::new(Some(router)),
            handle: axum_server::Handle::new(),
            closing: AtomicBool::new(false),
            state,
        }
    }

    /// Wait until the socket is bound and return its local address.
    ///
    /// Returns `None` if the server stopped before binding.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.handle.listening().await
    }

    fn bind(&self) -> Result<std::net::TcpListener, ServeError> {
        let addr = resolve_addr(&self.addr).map_err(|reason| {
            ServeError::Bind(std::io::Error::new(std::io::ErrorKind::InvalidInput, reason))
        })?;
        let listener = std::net::TcpListener::bind(addr).map_err(ServeError::Bind)?;
        listener.set_nonblocking(true).map_err(ServeError::Bind)?;
        Ok(listener)
    }
}

impl Listener for HttpServer {
    fn addr(&self) -> &str {
        &self.addr
    }

    fn serve(&self) -> BoxFuture<'_, Result<(), ServeError>> {
        async move {
            if self.closing.load(Ordering::SeqCst) {
                return Err(ServeError::Closed);
            }
            let router = self
                .router
                .lock()
                .ok()
                .and_then(|mut slot| slot.take())
                .ok_or(ServeError::Closed)?;

            let listener = self.bind()?;
            tracing::info!(
                address = %self.addr,
                local_addr = ?listener.local_addr().ok(),
                "HTTP server listening"
            );

            self.state.send_replace(ServeState::Serving);
            let result = axum_server::from_tcp(listener)
                .handle(self.handle.clone())
                .serve(router.into_make_service())
                .await;
            self.state.send_replace(ServeState::Stopped);

            tracing::debug!(address = %self.addr, "HTTP server stopped");
            result.map_err(ServeError::Io)
        }
        .boxed()
    }

    fn shutdown(&self, deadline: Instant) -> BoxFuture<'_, Result<(), ServeError>> {
        async move {
            self.closing.store(true, Ordering::SeqCst);
            self.handle.graceful_shutdown(None);

            let mut state = self.state.subscribe();
            let drained = tokio::time::timeout_at(
                deadline,
                state.wait_for(|s| *s != ServeState::Serving),
            )
            .await
            .is_ok();

            if drained {
                Ok(())
            } else {
                Err(ServeError::DrainTimeout)
            }
        }
        .boxed()
    }

    fn close(&self) -> Result<(), ServeError> {
        self.closing.store(true, Ordering::SeqCst);
        self.handle.shutdown();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use std::time::Duration;

    fn hello() -> Router {
        Router::new().route("/", get(|| async { "hello" }))
    }

    #[tokio::test]
    async fn shutdown_before_serve_reports_closed() {
        let server = HttpServer::new("127.0.0.1:0", hello());

        server
            .shutdown(Instant::now() + Duration::from_secs(1))
            .await
            .unwrap();

        assert!(matches!(server.serve().await, Err(ServeError::Closed)));
    }

    #[tokio::test]
    async fn serves_until_drained() {
        let server = std::sync::Arc::new(HttpServer::new("127.0.0.1:0", hello()));
        let serving = {
            let server = server.clone();
            tokio::spawn(async move { server.serve().await })
        };

        let local = server.local_addr().await.expect("server binds");
        let stream = tokio::net::TcpStream::connect(local).await;
        assert!(stream.is_ok());
        drop(stream);

        server
            .shutdown(Instant::now() + Duration::from_secs(5))
            .await
            .unwrap();
        assert!(serving.await.unwrap().is_ok());
        assert!(tokio::net::TcpStream::connect(local).await.is_err());
    }

    #[tokio::test]
    async fn address_in_use_is_a_bind_error() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = taken.local_addr().unwrap().to_string();
        let server = HttpServer::new(addr, hello());

        assert!(matches!(server.serve().await, Err(ServeError::Bind(_))));
    }

    #[tokio::test]
    async fn serving_twice_reports_closed() {
        let server = std::sync::Arc::new(HttpServer::new("127.0.0.1:0", hello()));
        let first = {
            let server = server.clone();
            tokio::spawn(async move { server.serve().await })
        };
        server.local_addr().await.expect("server binds");

        assert!(matches!(server.serve().await, Err(ServeError::Closed)));

        server.close().unwrap();
        assert!(first.await.unwrap().is_ok());
    }
}
