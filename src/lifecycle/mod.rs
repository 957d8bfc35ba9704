//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Configure (registry.rs):
//!     Composition root → add_server / add_job / add_startup_job / defer
//!
//! Startup (startup.rs):
//!     Startup jobs, in order, before anything concurrent
//!
//! Run (supervisor.rs, jobs::scheduler):
//!     One task per server (port order) + one task per job
//!
//! Shutdown (signals.rs → shutdown.rs):
//!     SIGTERM/SIGINT → cancel token → drain servers → join units → deferred
//! ```
//!
//! # Design Decisions
//! - Fatal errors unwind as values to one handler, `exit_on_fatal`
//! - Every unit lives in one `JoinSet`; nothing outlives the runtime
//! - Shutdown has a timeout: servers still draining at the deadline are closed

pub mod registry;
pub mod runtime;
pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod supervisor;

#[cfg(test)]
pub(crate) mod testing;

pub use registry::{DeferFn, Registry};
pub use runtime::{exit_on_fatal, Runtime};
pub use shutdown::DrainOutcome;
