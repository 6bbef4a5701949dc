//! Assignment Reconciler
//!
//! Pulls the cluster/truck assignment document from the ML service and
//! writes it back into the Farmer Store.
//!
//! The document is split on plain commas; quoted fields are not supported.
//! Updates run concurrently outside any transaction, so a failing update
//! leaves the ones that already finished applied.

use futures::future::try_join_all;
use pickup_common::db::farmers;
use pickup_common::db::AssignmentUpdate;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::ml::MlService;

/// Truck column names the ML service may emit, in preference order
pub const TRUCK_COLUMN_ALIASES: [&str; 3] = ["assigned_truck", "assigned_truck_x", "assigned_truck_y"];

/// Column positions resolved from the document header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentColumns {
    pub farmer_id: Option<usize>,
    pub cluster: Option<usize>,
    pub assigned_truck: Option<usize>,
}

impl AssignmentColumns {
    /// Resolve columns case-insensitively from a header line
    ///
    /// The truck column is the first alias present in
    /// [`TRUCK_COLUMN_ALIASES`] order and applies to every row.
    pub fn resolve(header_line: &str) -> Self {
        let headers: Vec<String> = split_line(header_line.trim_start_matches('\u{feff}'))
            .map(str::to_lowercase)
            .collect();
        let position = |name: &str| headers.iter().position(|h| h == name);

        Self {
            farmer_id: position("farmer_id"),
            cluster: position("cluster"),
            assigned_truck: TRUCK_COLUMN_ALIASES.iter().find_map(|alias| position(*alias)),
        }
    }

    fn update_from(&self, cells: &[&str]) -> Option<AssignmentUpdate> {
        let cell = |column: Option<usize>| {
            column
                .and_then(|i| cells.get(i).copied())
                .filter(|v| !v.is_empty())
        };

        let farmer_id = cell(self.farmer_id)?;

        Some(AssignmentUpdate {
            farmer_id: farmer_id.to_string(),
            cluster: cell(self.cluster).and_then(parse_cluster),
            assigned_truck: cell(self.assigned_truck).map(str::to_string),
        })
    }
}

fn split_line(line: &str) -> impl Iterator<Item = &str> {
    line.split(',').map(str::trim)
}

/// Integer cluster id; float renderings such as `2.0` truncate
fn parse_cluster(value: &str) -> Option<i64> {
    value.parse::<i64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v.trunc() as i64)
    })
}

/// Parse the assignment document into per-farmer updates
///
/// Blank lines and rows with an empty `farmer_id` are skipped. A document
/// without a `farmer_id` column yields no updates.
pub fn parse_assignments(document: &str) -> Vec<AssignmentUpdate> {
    let mut lines = document.lines();
    let columns = match lines.next() {
        Some(header) => AssignmentColumns::resolve(header),
        None => return Vec::new(),
    };

    if columns.farmer_id.is_none() {
        warn!("Assignment document has no farmer_id column");
        return Vec::new();
    }
    if columns.assigned_truck.is_none() {
        debug!("Assignment document has no truck column");
    }

    lines
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let cells: Vec<&str> = split_line(line).collect();
            columns.update_from(&cells)
        })
        .collect()
}

/// Apply updates concurrently
///
/// Returns the number of updates issued. The first failure is returned and
/// the remaining in-flight updates are dropped.
pub async fn apply_assignments(
    pool: &SqlitePool,
    updates: &[AssignmentUpdate],
) -> pickup_common::Result<usize> {
    let matched: u64 = try_join_all(
        updates
            .iter()
            .map(|update| farmers::update_assignment(pool, update)),
    )
    .await?
    .into_iter()
    .sum();

    debug!(issued = updates.len(), matched, "Assignment updates applied");
    Ok(updates.len())
}

/// Run the two-phase assignment protocol and persist the result
pub async fn reconcile_assignments(
    pool: &SqlitePool,
    ml: &dyn MlService,
    capacity: f64,
) -> ApiResult<usize> {
    ml.request_assignment(capacity)
        .await
        .map_err(ApiError::upstream("Assignment failed"))?;

    let document = ml
        .fetch_assignments()
        .await
        .map_err(ApiError::upstream("Failed to fetch assignments"))?;

    let updates = parse_assignments(&document);
    let persisted = apply_assignments(pool, &updates)
        .await
        .map_err(ApiError::operation("Failed to persist assignments"))?;

    info!(capacity, persisted, "Truck assignments persisted");
    Ok(persisted)
}
