//! Core module: configuration, shared state, HTTP server
//!
//! - [`Config`] - environment driven configuration
//! - [`ServerState`] - state shared by every handler
//! - [`Server`] - HTTP server

pub mod config;
pub mod server;
pub mod state;

pub use config::Config;
pub use server::Server;
pub use state::ServerState;
