//! CLI command implementations

use std::fs;
use std::path::Path;

use super::args::Command;
use super::config::{Config, StorageKind};
use super::errors::{CliError, CliResult};
use crate::http_server::HttpServer;
use crate::observability::{init_logging, log_event, Event, LogFormat};
use crate::service::TableService;

/// Run a CLI command
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Init { config } => init(&config),
        Command::Serve { config } => serve(&config),
        Command::Reset { config } => reset(&config),
    }
}

/// Logging failures never stop a command
fn install_logger(format: LogFormat) {
    if let Err(e) = init_logging(format) {
        eprintln!("{}", e);
    }
}

/// Load config and install the logger it asks for
fn boot(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    install_logger(config.log_format);

    log_event!(Event::BootStart);
    log_event!(
        Event::ConfigLoaded,
        path = %config_path.display(),
        storage = %config.storage
    );
    Ok(config)
}

fn open_service(config: &Config) -> CliResult<TableService> {
    let store = config.open_store()?;
    log_event!(
        Event::StoreOpened,
        storage = %config.storage,
        path = %config.database_path.display()
    );
    Ok(TableService::new(store))
}

/// Write a default config file. Refuses to overwrite.
pub fn init(config_path: &Path) -> CliResult<()> {
    install_logger(LogFormat::Text);

    if config_path.exists() {
        return Err(CliError::already_initialized(config_path));
    }

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let content = serde_json::to_string_pretty(&Config::default())?;
    fs::write(config_path, content)?;

    tracing::info!(path = %config_path.display(), "wrote default config");
    Ok(())
}

/// Open the configured store and serve HTTP until Ctrl-C
pub fn serve(config_path: &Path) -> CliResult<()> {
    let config = boot(config_path)?;
    let service = open_service(&config)?;
    let server = HttpServer::new(config.server.clone(), service);

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to start runtime: {}", e)))?;

    runtime
        .block_on(server.start())
        .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
}

/// Wipe the durable store and re-seed the demo table
pub fn reset(config_path: &Path) -> CliResult<()> {
    let config = boot(config_path)?;

    if config.storage != StorageKind::Sqlite {
        return Err(CliError::config_error(
            "reset requires storage 'sqlite'; the memory store starts fresh on every run",
        ));
    }

    let service = open_service(&config)?;
    service
        .reset()
        .map_err(|e| CliError::boot_failed(format!("Reset failed: {}", e)))?;

    log_event!(Event::StoreReset, path = %config.database_path.display());
    Ok(())
}
