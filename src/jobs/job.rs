//! Job descriptors and the context handed to each invocation.

use futures_util::future::{BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::BoxError;

/// Boxed future returned by a job invocation.
pub type JobFuture = BoxFuture<'static, Result<(), BoxError>>;

type JobFn = Arc<dyn Fn(JobContext) -> JobFuture + Send + Sync>;

/// Context passed to every job invocation.
///
/// Carries the job's name and the shared background token. Long-running
/// bodies should watch [`cancelled`](JobContext::cancelled) and return early.
#[derive(Clone)]
pub struct JobContext {
    name: Arc<str>,
    token: CancellationToken,
}

impl JobContext {
    pub(crate) fn new(name: Arc<str>, token: CancellationToken) -> Self {
        Self { name, token }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the runtime starts shutting down.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

impl fmt::Debug for JobContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobContext")
            .field("name", &self.name)
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}

/// A periodically invoked unit of work.
#[derive(Clone)]
pub struct Job {
    name: Arc<str>,
    interval: Duration,
    func: JobFn,
}

impl Job {
    pub fn new<F, Fut>(name: impl Into<Arc<str>>, interval: Duration, func: F) -> Self
    where
        F: Fn(JobContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            interval,
            func: Arc::new(move |ctx| func(ctx).boxed()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Build the context for one invocation of this job.
    pub fn context(&self, token: CancellationToken) -> JobContext {
        JobContext::new(Arc::clone(&self.name), token)
    }

    /// Run a single invocation.
    pub fn invoke(&self, ctx: JobContext) -> JobFuture {
        (self.func)(ctx)
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}
