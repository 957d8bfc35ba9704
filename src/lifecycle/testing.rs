//! In-memory listener used by the lifecycle tests.

use futures_util::future::{BoxFuture, FutureExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::net::{Listener, ServeError};

/// Ordered record of lifecycle events shared between fakes and test jobs.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }
}

/// How the fake reacts to lifecycle calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Serves until drained; drains instantly.
    Cooperative,
    /// Graceful shutdown never completes.
    HangOnShutdown,
    /// Graceful shutdown reports an error without stopping.
    FailShutdown,
    /// Graceful shutdown never completes and forceful close reports an
    /// error (after stopping).
    FailClose,
    /// `serve` fails immediately with a bind error.
    FailBind,
}

pub struct FakeServer {
    addr: String,
    behavior: Behavior,
    journal: Journal,
    background: Option<CancellationToken>,
    stopped: CancellationToken,
    pub shutdown_calls: AtomicUsize,
    pub close_calls: AtomicUsize,
    pub token_cancelled_at_shutdown: Mutex<Option<bool>>,
}

impl FakeServer {
    pub fn new(addr: &str) -> Arc<Self> {
        Self::with(addr, Behavior::Cooperative, Journal::default(), None)
    }

    pub fn with(
        addr: &str,
        behavior: Behavior,
        journal: Journal,
        background: Option<CancellationToken>,
    ) -> Arc<Self> {
        Arc::new(Self {
            addr: addr.to_string(),
            behavior,
            journal,
            background,
            stopped: CancellationToken::new(),
            shutdown_calls: AtomicUsize::new(0),
            close_calls: AtomicUsize::new(0),
            token_cancelled_at_shutdown: Mutex::new(None),
        })
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.is_cancelled()
    }
}

impl Listener for FakeServer {
    fn addr(&self) -> &str {
        &self.addr
    }

    fn serve(&self) -> BoxFuture<'_, Result<(), ServeError>> {
        async move {
            self.journal.push(format!("serve {}", self.addr));
            if self.behavior == Behavior::FailBind {
                return Err(ServeError::Bind(std::io::Error::from(
                    std::io::ErrorKind::AddrInUse,
                )));
            }
            self.stopped.cancelled().await;
            self.journal.push(format!("stopped {}", self.addr));
            Err(ServeError::Closed)
        }
        .boxed()
    }

    fn shutdown(&self, _deadline: Instant) -> BoxFuture<'_, Result<(), ServeError>> {
        async move {
            self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
            self.journal.push(format!("shutdown {}", self.addr));
            if let Some(token) = &self.background {
                *self.token_cancelled_at_shutdown.lock().unwrap() = Some(token.is_cancelled());
            }
            match self.behavior {
                Behavior::HangOnShutdown | Behavior::FailClose => std::future::pending().await,
                Behavior::FailShutdown => Err(ServeError::Io(std::io::Error::other("drain failed"))),
                _ => {
                    self.stopped.cancel();
                    Ok(())
                }
            }
        }
        .boxed()
    }

    fn close(&self) -> Result<(), ServeError> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.journal.push(format!("close {}", self.addr));
        self.stopped.cancel();
        if self.behavior == Behavior::FailClose {
            return Err(ServeError::Io(std::io::Error::other("socket already gone")));
        }
        Ok(())
    }
}
