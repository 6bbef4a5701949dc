//! Unit tests for config file loading and database path resolution
//!
//! - Missing config files SHALL NOT prevent startup
//! - Malformed config files are ignored with a warning
//! - DB_HOST / DB_NAME resolve to a database file

use pickup_common::config::{resolve_database_path, TomlConfig};
use std::io::Write;
use std::path::{Path, PathBuf};

#[test]
fn test_toml_config_parses_all_keys() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
ml_url = "http://ml.internal:9000"
port = 4100
bind = "127.0.0.1"
db_host = "/var/lib/pickup"
db_name = "prod.db"
ml_timeout_secs = 30
max_upload_mb = 5
"#
    )
    .unwrap();

    let config = TomlConfig::from_file(file.path()).unwrap();
    assert_eq!(config.ml_url.as_deref(), Some("http://ml.internal:9000"));
    assert_eq!(config.port, Some(4100));
    assert_eq!(config.bind.as_deref(), Some("127.0.0.1"));
    assert_eq!(config.db_host.as_deref(), Some("/var/lib/pickup"));
    assert_eq!(config.db_name.as_deref(), Some("prod.db"));
    assert_eq!(config.ml_timeout_secs, Some(30));
    assert_eq!(config.max_upload_mb, Some(5));
}

#[test]
fn test_partial_toml_config_leaves_rest_unset() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = 8080").unwrap();

    let config = TomlConfig::from_file(file.path()).unwrap();
    assert_eq!(config.port, Some(8080));
    assert_eq!(config.ml_url, None);
    assert_eq!(config.db_name, None);
}

#[test]
fn test_missing_config_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = TomlConfig::load_or_default(Some(&dir.path().join("absent.toml")));
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_malformed_config_file_is_ignored() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = \"not a number\"").unwrap();

    assert!(TomlConfig::from_file(file.path()).is_err());
    assert_eq!(TomlConfig::load_or_default(Some(file.path())), TomlConfig::default());
}

#[test]
fn test_unknown_key_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "db_password = \"secret\"").unwrap();

    assert!(TomlConfig::from_file(file.path()).is_err());
}

#[test]
fn test_database_path_joins_host_and_name() {
    assert_eq!(
        resolve_database_path("/srv/data", "farmers.db"),
        PathBuf::from("/srv/data/farmers.db")
    );
    assert_eq!(resolve_database_path(".", "farmers.db"), Path::new(".").join("farmers.db"));
}

#[test]
fn test_absolute_database_name_wins() {
    assert_eq!(
        resolve_database_path("/srv/data", "/tmp/other.db"),
        PathBuf::from("/tmp/other.db")
    );
}
