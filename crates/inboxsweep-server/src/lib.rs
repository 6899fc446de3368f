//! InboxSweep Server
//!
//! HTTP boundary and command line for the inbox cleanup assistant.

pub mod app;
pub mod cli;
pub mod config;
pub mod fixture;
pub mod routes;
pub mod scan;

pub use app::{build_app, run_server, AppState};
pub use cli::{Cli, Commands};
pub use config::ServerConfig;
pub use scan::ScanService;
