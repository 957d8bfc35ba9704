//! OS signal handling.
//!
//! # Responsibilities
//! - Register SIGINT and SIGTERM handlers before the runtime starts its units
//! - Resolve once, on the first of them
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Single-shot: once the future has resolved nothing listens any more, and
//!   later signals are swallowed by the installed handlers while draining
//! - Any other signal keeps its default disposition

use std::future::Future;

/// Install handlers and return a future resolving on the first
/// interrupt or terminate signal.
#[cfg(unix)]
pub fn termination() -> std::io::Result<impl Future<Output = ()> + Send> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    Ok(async move {
        tokio::select! {
            _ = interrupt.recv() => tracing::info!(signal = "SIGINT", "received shutdown signal"),
            _ = terminate.recv() => tracing::info!(signal = "SIGTERM", "received shutdown signal"),
        }
    })
}

/// Install handlers and return a future resolving on Ctrl+C.
#[cfg(not(unix))]
pub fn termination() -> std::io::Result<impl Future<Output = ()> + Send> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!(signal = "ctrl_c", "received shutdown signal"),
            Err(err) => tracing::error!(error = %err, "failed to listen for ctrl_c"),
        }
    })
}
