//! Farmer listing

use axum::{extract::State, Json};
use pickup_common::db::farmers::{self as store, FARMER_LIST_LIMIT};
use pickup_common::db::Farmer;

use crate::error::ApiResult;
use crate::AppState;

/// GET /api/farmers
///
/// Up to 1000 farmers ordered by `farmer_id`.
pub async fn list_farmers(State(state): State<AppState>) -> ApiResult<Json<Vec<Farmer>>> {
    let farmers = store::list_farmers(&state.db, FARMER_LIST_LIMIT).await?;
    Ok(Json(farmers))
}
