//! Periodic job execution.
//!
//! # Responsibilities
//! - Run each job on its own task: invoke immediately, then every interval
//! - Log invocation failures without stopping the schedule
//! - Exit cleanly once the shared token is cancelled
//!
//! # State Machine
//! ```text
//! Idle → Running → Waiting(interval) → Running → … → Cancelled
//! ```
//!
//! # Design Decisions
//! - The interval is measured from the end of the previous invocation
//! - Cancellation wins ties with the timer
//! - Errors returned after cancellation are shutdown noise, not failures

use std::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::error::FatalError;
use crate::jobs::job::Job;
use crate::observability::metrics::{self, JobOutcome};

/// Spawn one execution unit per job into `units`.
///
/// Launch order follows the iterator and carries no guarantee.
pub fn spawn_jobs<I>(
    jobs: I,
    token: &CancellationToken,
    units: &mut JoinSet<Result<(), FatalError>>,
) where
    I: IntoIterator<Item = Job>,
{
    for job in jobs {
        let span = tracing::info_span!("job", job = %job.name());
        let token = token.clone();
        tracing::debug!(job = %job.name(), interval = ?job.interval(), "starting job");
        units.spawn(
            async move {
                run_job(job, token).await;
                Ok(())
            }
            .instrument(span),
        );
    }
}

/// Drive a single job until `token` is cancelled.
pub async fn run_job(job: Job, token: CancellationToken) {
    let ctx = job.context(token.clone());

    loop {
        let start = Instant::now();
        let outcome = match job.invoke(ctx.clone()).await {
            Ok(()) => JobOutcome::Success,
            Err(err) if token.is_cancelled() => {
                tracing::debug!(error = %err, "job interrupted by shutdown");
                JobOutcome::Cancelled
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to run job");
                JobOutcome::Failure
            }
        };
        metrics::record_job(job.name(), outcome, start);

        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(job.interval()) => {}
        }
    }

    tracing::debug!("job stopped");
}
