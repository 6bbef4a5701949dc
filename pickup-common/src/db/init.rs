//! Database initialization
//!
//! Opens (or creates) the SQLite database and ensures the `farmers` table
//! exists. Schema creation is idempotent and runs on every startup.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Initialize database connection pool and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // journal_mode and busy_timeout apply to every pooled connection
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_farmers_table(&pool).await?;

    Ok(pool)
}

/// Initialize a private in-memory database
///
/// Every SQLite `:memory:` connection is a separate database, so the pool is
/// pinned to one connection that never expires.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    create_farmers_table(&pool).await?;

    Ok(pool)
}

async fn create_farmers_table(pool: &SqlitePool) -> Result<()> {
    // Numeric columns stay nullable: SQLite stores a bound NaN as NULL.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS farmers (
            farmer_id TEXT PRIMARY KEY,
            village TEXT,
            latitude REAL,
            longitude REAL,
            load_kg REAL,
            cluster INTEGER,
            assigned_truck TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
