//! WebSocket front end for the [`seabattle`] session engine.
//!
//! [`server`] accepts connections and feeds their messages to a single engine. The
//! binary in `main.rs` wraps it with command line parsing and logging setup.

pub mod server;

pub use server::{start_server, ServerConfig, ServerHandle};
