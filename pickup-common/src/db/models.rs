//! Farmer Store models

use serde::{Deserialize, Serialize};

/// One row of the `farmers` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Farmer {
    pub farmer_id: String,
    pub village: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub load_kg: Option<f64>,
    /// Set by assignment reconciliation only
    pub cluster: Option<i64>,
    /// Set by assignment reconciliation only
    pub assigned_truck: Option<String>,
}

/// Validated upload row, upserted by `farmer_id`
///
/// Numeric fields may be NaN when the uploaded text did not parse.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFarmer {
    pub farmer_id: String,
    pub village: String,
    pub latitude: f64,
    pub longitude: f64,
    pub load_kg: f64,
}

/// Cluster and truck assignment for one farmer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentUpdate {
    pub farmer_id: String,
    pub cluster: Option<i64>,
    pub assigned_truck: Option<String>,
}

/// Farmer count and total load for one cluster (null cluster = unassigned)
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ClusterStat {
    pub cluster: Option<i64>,
    pub cnt: i64,
    pub total_kg: Option<f64>,
}

/// Farmer count and total load for one truck (null truck = unassigned)
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct TruckStat {
    pub assigned_truck: Option<String>,
    pub cnt: i64,
    pub total_kg: Option<f64>,
}
