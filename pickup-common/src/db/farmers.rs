//! Farmer Store queries
//!
//! All mutations are scoped to a single `farmer_id`. Bulk upserts run inside
//! one transaction; assignment updates are independent statements.

use crate::db::models::{AssignmentUpdate, ClusterStat, Farmer, NewFarmer, TruckStat};
use crate::Result;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

/// Maximum rows returned by [`list_farmers`]
pub const FARMER_LIST_LIMIT: i64 = 1000;

/// Insert a farmer, or overwrite village/location/load when the id exists
///
/// `cluster` and `assigned_truck` are never touched here.
pub async fn upsert_farmer(conn: &mut SqliteConnection, farmer: &NewFarmer) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO farmers (farmer_id, village, latitude, longitude, load_kg)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(farmer_id) DO UPDATE SET
            village = excluded.village,
            latitude = excluded.latitude,
            longitude = excluded.longitude,
            load_kg = excluded.load_kg
        "#,
    )
    .bind(&farmer.farmer_id)
    .bind(&farmer.village)
    .bind(farmer.latitude)
    .bind(farmer.longitude)
    .bind(farmer.load_kg)
    .execute(conn)
    .await?;

    Ok(())
}

/// Upsert a batch of farmers atomically
///
/// Commits only after every row is written. Any failure rolls the whole
/// batch back and is returned to the caller. Returns the number of rows
/// upserted.
pub async fn upsert_batch(pool: &SqlitePool, farmers: &[NewFarmer]) -> Result<u64> {
    let mut tx = pool.begin().await?;

    for farmer in farmers {
        if let Err(e) = upsert_farmer(&mut *tx, farmer).await {
            warn!(farmer_id = %farmer.farmer_id, "Upsert failed, rolling back batch: {}", e);
            if let Err(rollback_err) = tx.rollback().await {
                warn!("Rollback failed: {}", rollback_err);
            }
            return Err(e);
        }
    }

    tx.commit().await?;
    debug!(rows = farmers.len(), "Upsert batch committed");

    Ok(farmers.len() as u64)
}

/// Set cluster and truck for one farmer
///
/// Returns the number of rows matched (0 when the id is unknown).
pub async fn update_assignment(pool: &SqlitePool, update: &AssignmentUpdate) -> Result<u64> {
    let result = sqlx::query("UPDATE farmers SET cluster = ?, assigned_truck = ? WHERE farmer_id = ?")
        .bind(update.cluster)
        .bind(&update.assigned_truck)
        .bind(&update.farmer_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// List farmers ordered by id, capped at `limit` rows
pub async fn list_farmers(pool: &SqlitePool, limit: i64) -> Result<Vec<Farmer>> {
    let farmers = sqlx::query_as::<_, Farmer>(
        r#"
        SELECT farmer_id, village, latitude, longitude, load_kg, cluster, assigned_truck
        FROM farmers
        ORDER BY farmer_id
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(farmers)
}

/// Count and total load per cluster
pub async fn cluster_stats(pool: &SqlitePool) -> Result<Vec<ClusterStat>> {
    let stats = sqlx::query_as::<_, ClusterStat>(
        r#"
        SELECT cluster, COUNT(*) AS cnt, SUM(load_kg) AS total_kg
        FROM farmers
        GROUP BY cluster
        ORDER BY cluster
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(stats)
}

/// Count and total load per assigned truck
pub async fn truck_stats(pool: &SqlitePool) -> Result<Vec<TruckStat>> {
    let stats = sqlx::query_as::<_, TruckStat>(
        r#"
        SELECT assigned_truck, COUNT(*) AS cnt, SUM(load_kg) AS total_kg
        FROM farmers
        GROUP BY assigned_truck
        ORDER BY assigned_truck
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(stats)
}
