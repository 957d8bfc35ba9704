//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Router (user handlers)
//!     → middleware.rs (request ID, tracing, body limit)
//!     → server.rs (HttpServer: bind, serve, drain, close)
//!     → Registry::add_server
//!
//! debug.rs:
//!     /healthz, /metrics → HttpServer on the debug port
//! ```

pub mod debug;
pub mod middleware;
pub mod server;

pub use debug::{debug_router, debug_server};
pub use middleware::{with_middleware, MAX_BODY_BYTES};
pub use server::HttpServer;
