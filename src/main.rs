//! Service Runtime demo service
//!
//! Runs one HTTP server and a `heartbeat` job under the runtime, plus the
//! built-in debug server (`/healthz`, `/metrics`) when enabled.
//!
//! ```text
//! service-runtime --config runtime.toml --port 8080 --heartbeat-secs 10
//! ```

use axum::{routing::get, Router};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;

use service_runtime::config::load_config;
use service_runtime::http::with_middleware;
use service_runtime::observability::logging;
use service_runtime::{exit_on_fatal, BoxError, FatalError, HttpServer, JobContext, Registry, Runtime};

#[derive(Parser)]
#[command(name = "service-runtime")]
#[command(about = "Demo service supervised by the service runtime", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for the demo HTTP server
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Seconds between heartbeat job runs
    #[arg(long, default_value_t = 10)]
    heartbeat_secs: u64,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    if let Err(err) = logging::init(&config.log) {
        eprintln!("{err}");
        std::process::exit(2);
    }

    tracing::info!(
        service = %config.service.name,
        debug_enabled = config.debug.enabled,
        shutdown_timeout_secs = config.shutdown.timeout_secs,
        "Configuration loaded"
    );

    let result = match Runtime::new(config).configure(|registry| setup(registry, &cli)) {
        Ok(runtime) => runtime.run().await,
        Err(err) => Err(err),
    };
    exit_on_fatal(result);
}

fn setup(registry: &mut Registry, cli: &Cli) -> Result<(), FatalError> {
    let router = with_middleware(
        Router::new()
            .route("/", get(|| async { "hello from service-runtime\n" }))
            .route("/ping", get(|| async { "pong\n" })),
        CorsLayer::permissive(),
    );
    registry.add_server(Arc::new(HttpServer::new(format!(":{}", cli.port), router)))?;

    registry.add_job(
        "heartbeat",
        Duration::from_secs(cli.heartbeat_secs),
        |ctx: JobContext| async move {
            tracing::info!(job = %ctx.name(), "heartbeat");
            Ok::<(), BoxError>(())
        },
    )?;

    registry.defer(|| tracing::info!("farewell"));
    Ok(())
}
