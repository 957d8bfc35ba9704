//! Service Runtime Library
//!
//! A single-process orchestrator for long-running services: register
//! servers, periodic jobs, startup jobs, and deferred cleanups, then let the
//! runtime start them in order and shut them down gracefully on SIGINT or
//! SIGTERM.
//!
//! ```text
//!   configure ──▶ startup jobs ──▶ servers + jobs ──▶ signal
//!                                                       │
//!   exit ◀── deferred cleanups ◀── join units ◀── drain servers ◀── cancel token
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod jobs;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::schema::RuntimeConfig;
pub use error::{BoxError, FatalError};
pub use http::HttpServer;
pub use jobs::JobContext;
pub use lifecycle::{exit_on_fatal, Registry, Runtime};
pub use net::{Listener, ServeError};
