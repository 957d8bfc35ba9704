//! Background job subsystem.
//!
//! # Data Flow
//! ```text
//! Registry::add_job(name, interval, fn)
//!     → job.rs (Job descriptor, JobContext)
//!     → scheduler.rs (one task per job: invoke → wait(interval | cancel) → …)
//! ```
//!
//! # Design Decisions
//! - Job failures are isolated per invocation and only logged
//! - The scheduler never produces a fatal error
//! - Jobs share nothing but the cancellation token

pub mod job;
pub mod scheduler;

pub use job::{Job, JobContext, JobFuture};
