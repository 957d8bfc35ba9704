//! Server supervision.
//!
//! # Responsibilities
//! - Launch one task per registered server, in port order
//! - Treat the listener-closed outcome as a normal stop
//! - Turn every other serve failure into a fatal error
//!
//! # Design Decisions
//! - A service that cannot serve one of its endpoints is not operational
//! - Fatal errors travel back through the task's result, never `exit`

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::error::FatalError;
use crate::net::Listener;
use crate::observability::metrics;

/// Spawn one execution unit per server into `units`, ascending by port.
pub fn spawn_servers(
    servers: &BTreeMap<u16, Arc<dyn Listener>>,
    units: &mut JoinSet<Result<(), FatalError>>,
) {
    for (port, server) in servers {
        tracing::info!(addr = %server.addr(), port, "starting server");
        units.spawn(supervise(Arc::clone(server)));
    }
}

/// Serve until the listener stops, classifying how it stopped.
pub async fn supervise(server: Arc<dyn Listener>) -> Result<(), FatalError> {
    metrics::server_started();
    let result = server.serve().await;
    metrics::server_stopped();

    match result {
        Err(source) if !source.is_closed() => Err(FatalError::Serve {
            addr: server.addr().to_string(),
            source,
        }),
        _ => {
            tracing::info!(addr = %server.addr(), "server stopped");
            Ok(())
        }
    }
}
