//! Configuration management for BiblioTrack.
//!
//! Values are layered: built-in defaults, then `config/default`, then
//! `config/{RUN_MODE}`, then `BIBLIOTRACK_*` environment variables, and
//! finally `DATABASE_PATH`. None of the files are required.

use std::env;
use std::path::PathBuf;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use directories::BaseDirs;
use serde::Deserialize;

use crate::error::{LibraryError, LibraryResult};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".bibliotrack";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "bibliotrack.sqlite";

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// SQLite file backing the library. Plays the role of the connection
    /// string; SQLite has no user or password.
    pub path: PathBuf,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout_ms: u64,
    /// Whether each connection enables `PRAGMA foreign_keys`.
    pub foreign_keys: bool,
}

impl DatabaseConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            foreign_keys: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> LibraryResult<Self> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // BIBLIOTRACK_DATABASE__BUSY_TIMEOUT_MS=... and friends
            .add_source(
                Environment::with_prefix("BIBLIOTRACK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.path", env::var("DATABASE_PATH").ok())?
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

/// Builder pre-seeded with every default so partial files still deserialize.
fn defaults() -> LibraryResult<ConfigBuilder<DefaultState>> {
    let logging = LoggingConfig::default();
    let builder = Config::builder()
        .set_default(
            "database.path",
            default_database_path()?.to_string_lossy().into_owned(),
        )?
        .set_default("database.busy_timeout_ms", DEFAULT_BUSY_TIMEOUT_MS)?
        .set_default("database.foreign_keys", true)?
        .set_default("logging.level", logging.level)?
        .set_default("logging.format", "pretty")?;
    Ok(builder)
}

/// Resolve the absolute path to the SQLite database inside the user's home.
pub fn default_database_path() -> LibraryResult<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or(LibraryError::HomeDirectory)?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}
