//! CSV upload endpoint

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::Json;
use futures::{pin_mut, Stream, StreamExt};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::ingest::ingest_csv;
use crate::AppState;

/// Multipart field carrying the CSV
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub db_rows_upserted: u64,
    pub ml_upload: Value,
}

/// Accept only file names ending in `.csv`, any case
pub fn is_csv_file_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".csv")
}

/// POST /api/upload-csv
///
/// The upload is spooled to a temporary file that is removed when the
/// request finishes, whatever the outcome.
pub async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        if !is_csv_file_name(&file_name) {
            return Err(ApiError::BadRequest(
                "Only .csv files are allowed".to_string(),
            ));
        }

        let spool = spool_to_temp_file(field).await?;
        info!(file = %file_name, "CSV upload received");

        let outcome = ingest_csv(&state.db, state.ml.as_ref(), &file_name, spool.path()).await?;

        return Ok(Json(UploadResponse {
            message: "CSV uploaded and processed".to_string(),
            db_rows_upserted: outcome.rows_upserted,
            ml_upload: outcome.ml_upload,
        }));
    }

    Err(ApiError::BadRequest("No file uploaded".to_string()))
}

/// Copy an upload stream into a fresh temporary file
///
/// Writes go through an async handle reopened on the spool file.
async fn spool_to_temp_file<S, E>(chunks: S) -> ApiResult<NamedTempFile>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    let spool = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(".csv")
        .tempfile()
        .map_err(|e| ApiError::Internal(format!("Failed to create temp file: {}", e)))?;
    let handle = spool
        .reopen()
        .map_err(|e| ApiError::Internal(format!("Failed to open temp file: {}", e)))?;
    let mut file = tokio::fs::File::from_std(handle);

    pin_mut!(chunks);
    while let Some(chunk) = chunks.next().await {
        let chunk =
            chunk.map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to write temp file: {}", e)))?;
    }
    file.flush()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to write temp file: {}", e)))?;

    Ok(spool)
}
