//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Runtime, supervisor, scheduler produce:
//!     → logging.rs (structured log events, service/job spans)
//!     → metrics.rs (job counters and latencies, running servers)
//!
//! Consumers:
//!     → stdout (JSON or pretty)
//!     → debug server GET /metrics (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
