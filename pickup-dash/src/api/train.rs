//! Train trigger

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub const DEFAULT_CLUSTER_COUNT: i64 = 5;

/// Body of POST /api/train
#[derive(Debug, Default, Deserialize)]
pub struct TrainRequest {
    /// Number of clusters
    pub k: Option<i64>,
}

/// POST /api/train
///
/// Relays the ML service's training response verbatim.
pub async fn train(
    State(state): State<AppState>,
    body: Option<Json<TrainRequest>>,
) -> ApiResult<Json<Value>> {
    let k = body
        .and_then(|Json(request)| request.k)
        .unwrap_or(DEFAULT_CLUSTER_COUNT);

    info!(k, "Training requested");
    let response = state
        .ml
        .train(k)
        .await
        .map_err(ApiError::upstream("Training failed"))?;

    Ok(Json(response))
}
