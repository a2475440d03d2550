//! CLI module for schemagrid
//!
//! Provides command-line interface for:
//! - init: Write a default config file
//! - serve: Open the configured store and serve HTTP
//! - reset: Re-seed the durable store

mod args;
mod commands;
mod config;
mod errors;

pub use args::{Cli, Command};
pub use commands::{init, reset, run_command, serve};
pub use config::{Config, StorageKind, ENV_DB_PATH, ENV_PORT, ENV_STORAGE};
pub use errors::{CliError, CliErrorCode, CliResult};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}
