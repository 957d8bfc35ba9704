//! The runtime orchestrator.
//!
//! # Responsibilities
//! - Own the configuration and the registry for the process lifetime
//! - Sequence startup jobs, servers, jobs, shutdown, and deferred cleanups
//! - Surface every fatal condition as a [`FatalError`] value
//!
//! # State Machine
//! ```text
//! Configuring → Starting → Running → Draining → Cleaning up → Done
//!                   │          │
//!                   └──────────┴──→ Failed (fatal error, cleanups skipped)
//! ```

use std::future::Future;
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};
use tracing::Instrument;

use crate::config::RuntimeConfig;
use crate::error::{BoxError, FatalError};
use crate::http::debug_server;
use crate::jobs::scheduler::spawn_jobs;
use crate::lifecycle::registry::{Registered, Registry};
use crate::lifecycle::{shutdown, signals, startup, supervisor};

/// A configured service, ready to run.
#[derive(Debug)]
pub struct Runtime {
    config: RuntimeConfig,
    registry: Registry,
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            registry: Registry::new(),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Run the composition root against the registry.
    ///
    /// Any error it returns is fatal.
    pub fn configure<F, E>(mut self, setup: F) -> Result<Self, FatalError>
    where
        F: FnOnce(&mut Registry) -> Result<(), E>,
        E: Into<BoxError>,
    {
        setup(&mut self.registry).map_err(FatalError::configure)?;
        Ok(self)
    }

    /// Run until SIGINT or SIGTERM, then shut down.
    pub async fn run(self) -> Result<(), FatalError> {
        let terminate = signals::termination().map_err(FatalError::Signal)?;
        self.run_until(terminate).await
    }

    /// Run until `terminate` resolves, then shut down.
    ///
    /// Returns early with an error if a startup job fails, a server cannot
    /// serve, or a unit panics. In that case every unit is aborted and
    /// deferred cleanups do not run.
    pub async fn run_until<F>(self, terminate: F) -> Result<(), FatalError>
    where
        F: Future<Output = ()> + Send,
    {
        let span = tracing::info_span!("service", service = %self.config.service.name);
        self.run_inner(terminate).instrument(span).await
    }

    async fn run_inner<F>(self, terminate: F) -> Result<(), FatalError>
    where
        F: Future<Output = ()> + Send,
    {
        let Runtime {
            config,
            mut registry,
        } = self;

        tracing::info!("starting service...");

        if config.debug.enabled {
            registry.add_server(Arc::new(debug_server(&config.debug)?))?;
        }

        let Registered {
            servers,
            jobs,
            startup_jobs,
            deferred,
            token,
        } = registry.freeze();

        startup::run_startup_jobs(&startup_jobs, &token).await?;

        let mut units = JoinSet::new();
        supervisor::spawn_servers(&servers, &mut units);
        spawn_jobs(jobs.into_values(), &token, &mut units);
        tracing::info!(servers = servers.len(), units = units.len(), "service running");

        tokio::pin!(terminate);
        loop {
            tokio::select! {
                _ = &mut terminate => break,
                Some(joined) = units.join_next() => settle(joined)?,
            }
        }

        shutdown::stop(&token, &servers, config.shutdown.timeout()).await;

        tracing::info!("waiting for jobs to finish");
        while let Some(joined) = units.join_next().await {
            if let Err(err) = settle(joined) {
                tracing::error!(error = %err, "unit failed during shutdown");
            }
        }

        shutdown::run_deferred(deferred);
        tracing::info!("bye!");
        Ok(())
    }
}

fn settle(joined: Result<Result<(), FatalError>, JoinError>) -> Result<(), FatalError> {
    match joined {
        Ok(result) => result,
        Err(err) => Err(FatalError::UnitPanicked(err.to_string())),
    }
}

/// Log a fatal error and terminate the process with status 1.
pub fn exit_on_fatal(result: Result<(), FatalError>) {
    if let Err(err) = result {
        tracing::error!(error = %err, "fatal error");
        std::process::exit(1);
    }
}
