//! Startup orchestration.
//!
//! # Responsibilities
//! - Run startup jobs once, one after another, in registration order
//! - Abort the runtime on the first failure, before anything concurrent starts
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - No timeout is imposed here; job bodies own their deadlines

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::error::FatalError;
use crate::jobs::Job;

/// Run every startup job in order, stopping at the first error.
pub async fn run_startup_jobs(jobs: &[Job], token: &CancellationToken) -> Result<(), FatalError> {
    for job in jobs {
        let span = tracing::info_span!("job", job = %job.name());
        let ctx = job.context(token.clone());

        async {
            tracing::info!("running startup job");
            job.invoke(ctx).await.map_err(|source| {
                tracing::debug!(error = %source, "startup job failed");
                FatalError::StartupJob {
                    name: job.name().to_string(),
                    source,
                }
            })
        }
        .instrument(span)
        .await?;
    }
    Ok(())
}
