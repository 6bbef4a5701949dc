//! Aggregate statistics

use axum::{extract::State, Json};
use pickup_common::db::farmers::{cluster_stats, truck_stats};
use pickup_common::db::{ClusterStat, TruckStat};
use serde::Serialize;

use crate::error::ApiResult;
use crate::AppState;

/// Farmer counts and load totals per cluster and per truck
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub by_cluster: Vec<ClusterStat>,
    pub by_truck: Vec<TruckStat>,
}

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let by_cluster = cluster_stats(&state.db).await?;
    let by_truck = truck_stats(&state.db).await?;

    Ok(Json(StatsResponse {
        by_cluster,
        by_truck,
    }))
}
