//! CLI module for errlens
//!
//! Provides the command-line interface for:
//! - serve: Load the configured bundle and serve the dashboard session
//! - check: Load and verify the configured bundle, print a summary

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{check, run, run_command, serve};
pub use errors::{CliError, CliResult};
