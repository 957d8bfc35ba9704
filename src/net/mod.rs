//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Registry::add_server(listener)
//!     → listener.rs (parse_port: address → uniqueness key)
//!     → supervisor spawns Listener::serve
//!
//! Shutdown:
//!     Listener::shutdown(deadline) → on error/timeout → Listener::close
//! ```
//!
//! # Design Decisions
//! - The runtime knows servers only through the `Listener` trait
//! - Ports are the identity of a server; hosts are not compared

pub mod listener;

pub use listener::{parse_port, resolve_addr, Listener, ServeError};
