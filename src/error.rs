//! Error taxonomy for the runtime.
//!
//! Everything that must end the process is a [`FatalError`]. Fatal errors
//! unwind to the caller of [`Runtime::run`](crate::lifecycle::Runtime::run),
//! which hands them to [`exit_on_fatal`](crate::lifecycle::exit_on_fatal).
//! Recoverable failures (job invocations, shutdown drain problems) never
//! leave the execution unit that observed them; they are only logged.

use thiserror::Error;

use crate::net::ServeError;

/// Boxed error returned by job bodies and user setup code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Conditions that terminate the process.
#[derive(Debug, Error)]
pub enum FatalError {
    /// A server address could not be parsed into a port.
    #[error("invalid server address {addr:?}: {reason}")]
    InvalidAddress { addr: String, reason: String },

    /// Two servers were registered on the same port.
    #[error("server already added on port {port}")]
    DuplicateServer { port: u16 },

    /// Two jobs were registered under the same name.
    #[error("job already added: {name}")]
    DuplicateJob { name: String },

    /// A job was registered with a zero interval.
    #[error("job {name} must have a non-zero interval")]
    InvalidInterval { name: String },

    /// The composition root failed before the runtime started.
    #[error("failed to start service: {0}")]
    Configure(#[source] BoxError),

    /// A startup job returned an error.
    #[error("failed to run startup job {name}: {source}")]
    StartupJob {
        name: String,
        #[source]
        source: BoxError,
    },

    /// A listener failed with anything other than the expected close.
    #[error("failed to serve {addr}: {source}")]
    Serve {
        addr: String,
        #[source]
        source: ServeError,
    },

    /// An execution unit panicked while the runtime was running.
    #[error("execution unit panicked: {0}")]
    UnitPanicked(String),

    /// Termination signal handlers could not be installed.
    #[error("failed to install signal handlers: {0}")]
    Signal(#[source] std::io::Error),

    /// The Prometheus recorder could not be installed.
    #[error("failed to install metrics recorder: {0}")]
    Metrics(String),
}

impl FatalError {
    /// Wrap an arbitrary setup error raised inside the configure callback.
    pub fn configure<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        FatalError::Configure(err.into())
    }
}
