//! Service settings
//!
//! Command-line flags and environment variables come from clap; anything
//! left unset falls back to the TOML config file, then compiled defaults.

use clap::Parser;
use pickup_common::config::{
    resolve_database_path, TomlConfig, DEFAULT_BIND, DEFAULT_DB_HOST, DEFAULT_DB_NAME,
    DEFAULT_MAX_UPLOAD_MB, DEFAULT_ML_TIMEOUT_SECS, DEFAULT_ML_URL, DEFAULT_PORT,
};
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for pickup-dash
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "pickup-dash")]
#[command(about = "Farmer pickup dashboard service")]
#[command(version)]
pub struct Args {
    /// Path to config.toml
    #[arg(long, env = "PICKUP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the ML clustering/assignment service
    #[arg(long, env = "ML_URL")]
    pub ml_url: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "BIND_ADDR")]
    pub bind: Option<String>,

    /// Directory holding the database file
    #[arg(long, env = "DB_HOST")]
    pub db_host: Option<String>,

    /// Database file name
    #[arg(long, env = "DB_NAME")]
    pub db_name: Option<String>,

    /// Database user (unused by SQLite)
    #[arg(long, env = "DB_USER")]
    pub db_user: Option<String>,

    /// Database password (unused by SQLite)
    #[arg(long, env = "DB_PASS", hide_env_values = true)]
    pub db_pass: Option<String>,

    /// Timeout for each ML service request, in seconds
    #[arg(long, env = "ML_TIMEOUT_SECS")]
    pub ml_timeout_secs: Option<u64>,

    /// Largest accepted upload, in megabytes
    #[arg(long, env = "MAX_UPLOAD_MB")]
    pub max_upload_mb: Option<usize>,
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub ml_url: String,
    pub bind: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub ml_timeout: Duration,
    pub max_upload_bytes: usize,
    /// DB_USER or DB_PASS was supplied
    pub db_credentials_supplied: bool,
}

impl Settings {
    /// Merge arguments over the config file over compiled defaults
    pub fn resolve(args: Args, file: TomlConfig) -> Self {
        let db_host = args
            .db_host
            .or(file.db_host)
            .unwrap_or_else(|| DEFAULT_DB_HOST.to_string());
        let db_name = args
            .db_name
            .or(file.db_name)
            .unwrap_or_else(|| DEFAULT_DB_NAME.to_string());

        Self {
            ml_url: args
                .ml_url
                .or(file.ml_url)
                .unwrap_or_else(|| DEFAULT_ML_URL.to_string()),
            bind: args
                .bind
                .or(file.bind)
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            port: args.port.or(file.port).unwrap_or(DEFAULT_PORT),
            database_path: resolve_database_path(&db_host, &db_name),
            ml_timeout: Duration::from_secs(
                args.ml_timeout_secs
                    .or(file.ml_timeout_secs)
                    .unwrap_or(DEFAULT_ML_TIMEOUT_SECS),
            ),
            max_upload_bytes: args
                .max_upload_mb
                .or(file.max_upload_mb)
                .unwrap_or(DEFAULT_MAX_UPLOAD_MB)
                * 1024
                * 1024,
            db_credentials_supplied: args.db_user.is_some() || args.db_pass.is_some(),
        }
    }

    /// `host:port` to bind the listener on
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
