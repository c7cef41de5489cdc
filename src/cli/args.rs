//! CLI argument definitions using clap
//!
//! Commands:
//! - errlens serve --config <path>
//! - errlens check --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// errlens - inspect where a text classifier goes wrong
#[derive(Parser, Debug)]
#[command(name = "errlens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load the dataset bundle and serve the dashboard session
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./errlens.json")]
        config: PathBuf,
    },

    /// Load the dataset bundle, verify it, and print a JSON summary
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./errlens.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_with_default_config_path() {
        let cli = Cli::try_parse_from(["errlens", "serve"]).unwrap();
        match cli.command {
            Command::Serve { config } => {
                assert_eq!(config, PathBuf::from("./errlens.json"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_check_with_explicit_config_path() {
        let cli = Cli::try_parse_from(["errlens", "check", "--config", "/etc/errlens.json"]).unwrap();
        match cli.command {
            Command::Check { config } => {
                assert_eq!(config, PathBuf::from("/etc/errlens.json"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["errlens"]).is_err());
    }
}
