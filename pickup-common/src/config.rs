//! Configuration file loading and database location resolution
//!
//! Service settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Tiers 1 and 2 belong to each binary's argument parser. This module owns
//! tiers 3 and 4.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Base URL of the external clustering/assignment service
pub const DEFAULT_ML_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_BIND: &str = "0.0.0.0";
/// Directory holding the SQLite database file
pub const DEFAULT_DB_HOST: &str = ".";
pub const DEFAULT_DB_NAME: &str = "farmers.db";
pub const DEFAULT_ML_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_UPLOAD_MB: usize = 20;

/// Optional settings read from `config.toml`
///
/// Every key is optional; absent keys fall through to compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub ml_url: Option<String>,
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub db_host: Option<String>,
    pub db_name: Option<String>,
    pub ml_timeout_secs: Option<u64>,
    pub max_upload_mb: Option<usize>,
}

impl TomlConfig {
    /// Parse a config file, failing on I/O or syntax errors
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load the config file with graceful degradation
    ///
    /// Uses `path` when given, else the platform default location. A missing
    /// file yields defaults silently; an unreadable or malformed file is
    /// logged and ignored so the service still starts.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) => path,
            None => return Self::default(),
        };

        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::from_file(&path) {
            Ok(config) => {
                info!("Loaded config file: {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file: {}", e);
                Self::default()
            }
        }
    }
}

/// Platform config file location (`~/.config/pickup/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pickup").join("config.toml"))
}

/// Resolve the SQLite database file from `DB_HOST` and `DB_NAME`
///
/// `db_host` is the directory holding the file. An absolute `db_name` is used
/// as-is.
pub fn resolve_database_path(db_host: &str, db_name: &str) -> PathBuf {
    let name = Path::new(db_name);
    if name.is_absolute() {
        return name.to_path_buf();
    }
    Path::new(db_host).join(name)
}
