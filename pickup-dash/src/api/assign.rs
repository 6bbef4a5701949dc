//! Assignment trigger

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::reconcile::reconcile_assignments;
use crate::AppState;

/// Default truck capacity in kg
pub const DEFAULT_TRUCK_CAPACITY: f64 = 5000.0;

/// Body of POST /api/assign
#[derive(Debug, Default, Deserialize)]
pub struct AssignRequest {
    /// Truck capacity in kg
    pub capacity: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct AssignResponse {
    pub message: String,
    /// Number of updates issued
    pub persisted: usize,
}

/// POST /api/assign
pub async fn assign(
    State(state): State<AppState>,
    body: Option<Json<AssignRequest>>,
) -> ApiResult<Json<AssignResponse>> {
    let capacity = body
        .and_then(|Json(request)| request.capacity)
        .unwrap_or(DEFAULT_TRUCK_CAPACITY);

    let persisted = reconcile_assignments(&state.db, state.ml.as_ref(), capacity).await?;

    Ok(Json(AssignResponse {
        message: "Assignments saved".to_string(),
        persisted,
    }))
}
