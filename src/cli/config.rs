//! Configuration file
//!
//! JSON, every field optional. A missing file means all defaults.
//! `SCHEMAGRID_PORT`, `SCHEMAGRID_STORAGE` and `SCHEMAGRID_DB_PATH` override the file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::http_server::HttpServerConfig;
use crate::observability::LogFormat;
use crate::store::{MemoryTableStore, SqliteTableStore, TableStore};

pub const ENV_PORT: &str = "SCHEMAGRID_PORT";
pub const ENV_STORAGE: &str = "SCHEMAGRID_STORAGE";
pub const ENV_DB_PATH: &str = "SCHEMAGRID_DB_PATH";

/// Table store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Process-local, lost on exit
    #[default]
    Memory,
    /// Durable SQLite file at `database_path`
    Sqlite,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Memory => f.write_str("memory"),
            StorageKind::Sqlite => f.write_str("sqlite"),
        }
    }
}

impl FromStr for StorageKind {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(StorageKind::Memory),
            "sqlite" => Ok(StorageKind::Sqlite),
            other => Err(CliError::config_error(format!(
                "Invalid storage: '{}'. Expected 'memory' or 'sqlite'.",
                other
            ))),
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("data/app.db")
}

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub server: HttpServerConfig,

    #[serde(default)]
    pub storage: StorageKind,

    /// SQLite file, used only when `storage` is `sqlite`
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: HttpServerConfig::default(),
            storage: StorageKind::default(),
            database_path: default_database_path(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, then apply environment overrides
    pub fn load(path: &Path) -> CliResult<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Load with an explicit environment lookup
    pub fn load_with_env(path: &Path, env: impl Fn(&str) -> Option<String>) -> CliResult<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;
            serde_json::from_str(&content)
                .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?
        } else {
            Config::default()
        };

        config.apply_env(env)?;
        config.validate()?;

        Ok(config)
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> CliResult<()> {
        if let Some(port) = env(ENV_PORT) {
            self.server.port = port.parse().map_err(|_| {
                CliError::config_error(format!("Invalid {}: '{}'", ENV_PORT, port))
            })?;
        }
        if let Some(storage) = env(ENV_STORAGE) {
            self.storage = storage.parse()?;
        }
        if let Some(path) = env(ENV_DB_PATH) {
            self.database_path = PathBuf::from(path);
        }
        Ok(())
    }

    fn validate(&self) -> CliResult<()> {
        if self.server.host.trim().is_empty() {
            return Err(CliError::config_error("host must not be empty"));
        }

        if self.server.port == 0 {
            return Err(CliError::config_error("port must be > 0"));
        }

        if self.storage == StorageKind::Sqlite && self.database_path.as_os_str().is_empty() {
            return Err(CliError::config_error(
                "database_path must be set when storage is 'sqlite'",
            ));
        }

        Ok(())
    }

    /// Open the configured table store
    pub fn open_store(&self) -> CliResult<Arc<dyn TableStore>> {
        let store: Arc<dyn TableStore> = match self.storage {
            StorageKind::Memory => Arc::new(MemoryTableStore::new()),
            StorageKind::Sqlite => Arc::new(SqliteTableStore::open(&self.database_path)?),
        };
        Ok(store)
    }
}
