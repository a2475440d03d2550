//! CLI argument definitions using clap
//!
//! Commands:
//! - schemagrid init --config <path>
//! - schemagrid serve --config <path>
//! - schemagrid reset --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// schemagrid - schema-driven table service
#[derive(Parser, Debug)]
#[command(name = "schemagrid")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default configuration file
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./schemagrid.json")]
        config: PathBuf,
    },

    /// Start the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./schemagrid.json")]
        config: PathBuf,
    },

    /// Wipe the durable store and re-seed the demo table
    Reset {
        /// Path to configuration file
        #[arg(long, default_value = "./schemagrid.json")]
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
    fn test_parse_serve_with_config() {
        let cli = Cli::try_parse_from(["schemagrid", "serve", "--config", "/etc/sg.json"]).unwrap();
        match cli.command {
            Command::Serve { config } => assert_eq!(config, PathBuf::from("/etc/sg.json")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_default_config_path() {
        let cli = Cli::try_parse_from(["schemagrid", "reset"]).unwrap();
        match cli.command {
            Command::Reset { config } => assert_eq!(config, PathBuf::from("./schemagrid.json")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_command_fails() {
        assert!(Cli::try_parse_from(["schemagrid", "query"]).is_err());
    }
}
