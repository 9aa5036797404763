//! failwatch CLI - environment, logging and subcommands of the `failwatch` binary
//!
//! The binary wires the engine to its collaborators:
//! - `scan`: fetch, cross-reference, aggregate and print reports
//! - `file`: as `scan`, then file one ticket per report
//! - `replay`: run the engine over local JSON dumps, offline

#![warn(unreachable_pub)]

pub mod commands;
pub mod config;
pub mod logging;

pub use config::{AppConfig, ConfigError};
pub use logging::init_tracing;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
