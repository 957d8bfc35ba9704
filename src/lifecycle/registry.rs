//! Registration of servers, jobs, and deferred cleanups.
//!
//! # Responsibilities
//! - Collect everything the runtime will supervise before it starts
//! - Reject duplicate ports and job names at registration time
//! - Keep startup jobs and deferred cleanups in registration order
//!
//! # Design Decisions
//! - Single owner, no locking: the registry is filled by the composition
//!   root and then consumed by the runtime, which freezes its key sets
//! - Servers are kept sorted by port so launch order is reproducible

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::{BoxError, FatalError};
use crate::jobs::{Job, JobContext};
use crate::net::{parse_port, Listener};

/// Zero-argument cleanup run once at the end of shutdown.
pub type DeferFn = Box<dyn FnOnce() + Send + 'static>;

/// Everything declared for the runtime to supervise.
pub struct Registry {
    servers: BTreeMap<u16, Arc<dyn Listener>>,
    jobs: HashMap<String, Job>,
    startup_jobs: Vec<Job>,
    deferred: Vec<DeferFn>,
    token: CancellationToken,
}

/// The frozen contents of a [`Registry`], handed to the runtime.
pub(crate) struct Registered {
    pub servers: BTreeMap<u16, Arc<dyn Listener>>,
    pub jobs: HashMap<String, Job>,
    pub startup_jobs: Vec<Job>,
    pub deferred: Vec<DeferFn>,
    pub token: CancellationToken,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            servers: BTreeMap::new(),
            jobs: HashMap::new(),
            startup_jobs: Vec::new(),
            deferred: Vec::new(),
            token: CancellationToken::new(),
        }
    }

    /// Register a server. Its port, parsed from [`Listener::addr`], must be unique.
    pub fn add_server(&mut self, server: Arc<dyn Listener>) -> Result<(), FatalError> {
        let port = parse_port(server.addr()).map_err(|reason| FatalError::InvalidAddress {
            addr: server.addr().to_string(),
            reason,
        })?;

        if self.servers.contains_key(&port) {
            return Err(FatalError::DuplicateServer { port });
        }

        tracing::debug!(port, addr = %server.addr(), "server registered");
        self.servers.insert(port, server);
        Ok(())
    }

    /// Register a job invoked immediately and then every `interval`.
    pub fn add_job<F, Fut>(
        &mut self,
        name: &str,
        interval: Duration,
        func: F,
    ) -> Result<(), FatalError>
    where
        F: Fn(JobContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.insert_job(Job::new(name, interval, func)).map(|_| ())
    }

    /// Register a job that additionally runs once, synchronously, before
    /// anything concurrent starts. A failure there is fatal.
    pub fn add_startup_job<F, Fut>(
        &mut self,
        name: &str,
        interval: Duration,
        func: F,
    ) -> Result<(), FatalError>
    where
        F: Fn(JobContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        let job = self.insert_job(Job::new(name, interval, func))?;
        self.startup_jobs.push(job);
        Ok(())
    }

    fn insert_job(&mut self, job: Job) -> Result<Job, FatalError> {
        if job.interval().is_zero() {
            return Err(FatalError::InvalidInterval {
                name: job.name().to_string(),
            });
        }
        if self.jobs.contains_key(job.name()) {
            return Err(FatalError::DuplicateJob {
                name: job.name().to_string(),
            });
        }

        tracing::debug!(job = %job.name(), interval = ?job.interval(), "job registered");
        self.jobs.insert(job.name().to_string(), job.clone());
        Ok(job)
    }

    /// Register a cleanup callback. Callbacks run in registration order
    /// after every server and job has stopped.
    pub fn defer<F>(&mut self, func: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.deferred.push(Box::new(func));
    }

    /// Clone of the token cancelled when shutdown begins.
    pub fn background_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Registered ports, ascending.
    pub fn ports(&self) -> Vec<u16> {
        self.servers.keys().copied().collect()
    }

    pub(crate) fn freeze(self) -> Registered {
        Registered {
            servers: self.servers,
            jobs: self.jobs,
            startup_jobs: self.startup_jobs,
            deferred: self.deferred,
            token: self.token,
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("ports", &self.servers.keys().collect::<Vec<_>>())
            .field("jobs", &self.jobs.keys().collect::<Vec<_>>())
            .field("startup_jobs", &self.startup_jobs.len())
            .field("deferred", &self.deferred.len())
            .finish()
    }
}
