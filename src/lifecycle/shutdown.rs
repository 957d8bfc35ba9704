//! Shutdown coordination.
//!
//! # Responsibilities
//! - Cancel the shared background token before any server is touched
//! - Drain every server against one deadline, closing stragglers forcefully
//! - Run deferred cleanups in registration order
//!
//! # Design Decisions
//! - Drain problems are logged per server and never abort the shutdown
//! - The deadline is enforced here even if a listener ignores it
//! - Cleanups have no timeout; a hung cleanup hangs the shutdown

use futures_util::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::lifecycle::registry::DeferFn;
use crate::net::{Listener, ServeError};

const FAR_FUTURE_SECS: u64 = 86_400 * 365 * 30;

/// How a server left the drain phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Graceful shutdown completed before the deadline.
    Graceful,
    /// Graceful shutdown failed or timed out; the server was closed.
    Forced,
    /// The forceful close reported an error as well.
    CloseFailed,
}

/// Cancel background work, then drain every server.
///
/// Returns each server's outcome keyed by port.
pub async fn stop(
    token: &CancellationToken,
    servers: &BTreeMap<u16, Arc<dyn Listener>>,
    timeout: Duration,
) -> BTreeMap<u16, DrainOutcome> {
    tracing::info!("stopping jobs");
    token.cancel();

    tracing::info!(timeout = ?timeout, "shutting down servers");
    let deadline = deadline_after(timeout);

    let drains = servers.iter().map(|(port, server)| async move {
        (*port, drain(*port, server.as_ref(), deadline).await)
    });
    join_all(drains).await.into_iter().collect()
}

/// Instant `timeout` from now, saturating at roughly thirty years.
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + Duration::from_secs(FAR_FUTURE_SECS))
}

/// Gracefully shut one server down, escalating to a forceful close.
pub async fn drain(port: u16, server: &dyn Listener, deadline: Instant) -> DrainOutcome {
    let graceful = match tokio::time::timeout_at(deadline, server.shutdown(deadline)).await {
        Ok(result) => result,
        Err(_) => Err(ServeError::DrainTimeout),
    };

    let Err(err) = graceful else {
        tracing::debug!(port, "server drained");
        return DrainOutcome::Graceful;
    };

    tracing::warn!(port, error = %err, "graceful shutdown failed - shutting down forcefully");
    match server.close() {
        Ok(()) => DrainOutcome::Forced,
        Err(err) => {
            tracing::warn!(port, error = %err, "forceful shutdown failed");
            DrainOutcome::CloseFailed
        }
    }
}

/// Run cleanups first-in, first-out.
pub fn run_deferred(deferred: Vec<DeferFn>) {
    if !deferred.is_empty() {
        tracing::debug!(count = deferred.len(), "running deferred cleanups");
    }
    for cleanup in deferred {
        cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::testing::{Behavior, FakeServer, Journal};
    use crate::observability::logging::capture;
    use std::sync::atomic::Ordering;
    use tracing::Level;

    fn servers(list: &[Arc<FakeServer>]) -> BTreeMap<u16, Arc<dyn Listener>> {
        list.iter()
            .map(|s| {
                let port = crate::net::parse_port(s.addr()).unwrap();
                (port, Arc::clone(s) as Arc<dyn Listener>)
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn token_is_cancelled_before_any_server_shutdown() {
        let token = CancellationToken::new();
        let journal = Journal::default();
        let a = FakeServer::with(":8080", Behavior::Cooperative, journal.clone(), Some(token.clone()));
        let b = FakeServer::with(":8081", Behavior::Cooperative, journal.clone(), Some(token.clone()));

        let outcomes = stop(&token, &servers(&[a.clone(), b.clone()]), Duration::from_secs(5)).await;

        for server in [&a, &b] {
            assert_eq!(*server.token_cancelled_at_shutdown.lock().unwrap(), Some(true));
            assert_eq!(server.shutdown_calls.load(Ordering::SeqCst), 1);
            assert_eq!(server.close_calls.load(Ordering::SeqCst), 0);
        }
        assert!(outcomes.values().all(|o| *o == DrainOutcome::Graceful));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_server_is_closed_at_the_deadline() {
        let token = CancellationToken::new();
        let stuck = FakeServer::with(":8080", Behavior::HangOnShutdown, Journal::default(), None);
        let healthy = FakeServer::new(":8081");
        let start = Instant::now();

        let outcomes = stop(
            &token,
            &servers(&[stuck.clone(), healthy.clone()]),
            Duration::from_secs(5),
        )
        .await;

        assert_eq!(start.elapsed(), Duration::from_secs(5));
        assert_eq!(outcomes[&8080], DrainOutcome::Forced);
        assert_eq!(outcomes[&8081], DrainOutcome::Graceful);
        assert_eq!(stuck.close_calls.load(Ordering::SeqCst), 1);
        assert!(stuck.is_stopped());
        assert_eq!(healthy.close_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_graceful_shutdown_escalates_immediately() {
        let (logs, _guard) = capture::install();
        let server = FakeServer::with(":9000", Behavior::FailShutdown, Journal::default(), None);
        let start = Instant::now();

        let outcome = drain(9000, server.as_ref(), start + Duration::from_secs(5)).await;

        assert_eq!(outcome, DrainOutcome::Forced);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(
            logs.count(Level::WARN, "graceful shutdown failed - shutting down forcefully"),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn close_failure_does_not_stop_other_servers() {
        let (logs, _guard) = capture::install();
        let token = CancellationToken::new();
        let broken = FakeServer::with(":8080", Behavior::FailClose, Journal::default(), None);
        let healthy = FakeServer::new(":8081");

        let outcomes = stop(
            &token,
            &servers(&[broken.clone(), healthy.clone()]),
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(outcomes[&8080], DrainOutcome::CloseFailed);
        assert_eq!(outcomes[&8081], DrainOutcome::Graceful);
        assert!(healthy.is_stopped());
        assert_eq!(logs.count(Level::WARN, "forceful shutdown failed"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_timeout_saturates_instead_of_overflowing() {
        let token = CancellationToken::new();
        let server = FakeServer::new(":8080");

        let outcomes = stop(&token, &servers(&[server.clone()]), Duration::MAX).await;

        assert!(token.is_cancelled());
        assert_eq!(outcomes[&8080], DrainOutcome::Graceful);
        assert!(stop(&token, &BTreeMap::new(), Duration::from_secs(u64::MAX)).await.is_empty());
    }

    #[test]
    fn deferred_cleanups_run_in_registration_order() {
        let journal = Journal::default();
        let deferred: Vec<DeferFn> = ["A", "B", "C"]
            .into_iter()
            .map(|name| {
                let journal = journal.clone();
                Box::new(move || journal.push(name)) as DeferFn
            })
            .collect();

        run_deferred(deferred);

        assert_eq!(journal.entries(), vec!["A", "B", "C"]);
    }
}
