//! Listener abstraction supervised by the runtime.
//!
//! # Responsibilities
//! - Define what the supervisor needs from a network server
//! - Distinguish the expected "closed" outcome from real failures
//! - Derive the port key from an address string
//!
//! # Design Decisions
//! - Servers are shared as `Arc<dyn Listener>`: the supervisor task owns a
//!   clone for `serve`, the shutdown coordinator uses another to drain it
//! - `shutdown` takes an absolute deadline so every server drains against
//!   the same clock started at the termination trigger

use futures_util::future::BoxFuture;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use thiserror::Error;
use tokio::time::Instant;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ServeError {
    /// The listener was already closed by the shutdown coordinator.
    #[error("listener closed")]
    Closed,

    /// Failed to bind the address.
    #[error("failed to bind: {0}")]
    Bind(#[source] std::io::Error),

    /// I/O failure while serving.
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Graceful shutdown did not finish before the deadline.
    #[error("graceful shutdown did not finish before the deadline")]
    DrainTimeout,
}

impl ServeError {
    /// Whether this is the expected outcome of our own draining.
    pub fn is_closed(&self) -> bool {
        matches!(self, ServeError::Closed)
    }
}

/// A long-running network server owned by the supervisor.
pub trait Listener: Send + Sync + 'static {
    /// Address string the server was declared with (e.g. `":8080"`).
    fn addr(&self) -> &str;

    /// Serve until closed. Returns `Ok(())` or [`ServeError::Closed`] when
    /// stopped by [`shutdown`](Listener::shutdown) or [`close`](Listener::close).
    fn serve(&self) -> BoxFuture<'_, Result<(), ServeError>>;

    /// Stop accepting and let in-flight work finish before `deadline`.
    fn shutdown(&self, deadline: Instant) -> BoxFuture<'_, Result<(), ServeError>>;

    /// Tear the listener down immediately, abandoning in-flight work.
    fn close(&self) -> Result<(), ServeError>;
}

/// Resolve an address string into a socket address.
///
/// An empty host (`":8080"`) binds every IPv4 interface.
pub fn resolve_addr(addr: &str) -> Result<SocketAddr, String> {
    if let Some(port) = addr.strip_prefix(':') {
        let port = parse_port_number(port)?;
        return Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port));
    }
    addr.parse::<SocketAddr>().map_err(|e| e.to_string())
}

/// Extract the port used as the server's uniqueness key.
pub fn parse_port(addr: &str) -> Result<u16, String> {
    resolve_addr(addr).map(|sock| sock.port())
}

fn parse_port_number(port: &str) -> Result<u16, String> {
    port.parse::<u16>()
        .map_err(|e| format!("invalid port {port:?}: {e}"))
}
