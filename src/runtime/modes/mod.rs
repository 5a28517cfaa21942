//! Mode routing
//!
//! - Server mode (HTTP server, default)
//! - Lookup mode (single query from the command line)

pub mod cli;
pub mod server;

pub use cli::run_lookup;
pub use server::run_server;
