//! Metrics collection and exposition.
//!
//! # Metrics
//! - `runtime_job_invocations_total` (counter): invocations by job, outcome
//! - `runtime_job_duration_seconds` (histogram): invocation latency by job
//! - `runtime_servers_running` (gauge): servers currently inside `serve`
//!
//! # Design Decisions
//! - One process-wide Prometheus recorder, installed lazily and only once
//! - Recording is a no-op until the recorder is installed

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

use crate::error::FatalError;

static RECORDER: OnceLock<Result<PrometheusHandle, String>> = OnceLock::new();

/// Outcome label for a job invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Success,
    Failure,
    Cancelled,
}

impl JobOutcome {
    fn as_str(self) -> &'static str {
        match self {
            JobOutcome::Success => "success",
            JobOutcome::Failure => "failure",
            JobOutcome::Cancelled => "cancelled",
        }
    }
}

/// Install the Prometheus recorder, or return the one already installed.
pub fn install() -> Result<PrometheusHandle, FatalError> {
    RECORDER
        .get_or_init(|| {
            PrometheusBuilder::new()
                .install_recorder()
                .map_err(|e| e.to_string())
        })
        .clone()
        .map_err(FatalError::Metrics)
}

/// Record one finished job invocation.
pub fn record_job(job: &str, outcome: JobOutcome, start: Instant) {
    metrics::counter!(
        "runtime_job_invocations_total",
        "job" => job.to_owned(),
        "outcome" => outcome.as_str(),
    )
    .increment(1);
    metrics::histogram!("runtime_job_duration_seconds", "job" => job.to_owned())
        .record(start.elapsed().as_secs_f64());
}

/// A server entered its serve loop.
pub fn server_started() {
    metrics::gauge!("runtime_servers_running").increment(1.0);
}

/// A server left its serve loop.
pub fn server_stopped() {
    metrics::gauge!("runtime_servers_running").decrement(1.0);
}
