//! CSV Ingestor
//!
//! Parses an uploaded farmer CSV, upserts the valid rows in one transaction,
//! then forwards the untouched file to the ML service as training data.
//!
//! Row policy is permissive: a row lacking any required column is skipped,
//! and an unparseable number becomes NaN rather than rejecting the row.

use csv::{ReaderBuilder, StringRecord, Trim};
use pickup_common::db::farmers;
use pickup_common::db::NewFarmer;
use serde_json::Value;
use sqlx::SqlitePool;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::ml::MlService;

/// Columns every uploaded row must carry
pub const REQUIRED_COLUMNS: [&str; 5] = ["farmer_id", "village", "latitude", "longitude", "load_kg"];

/// Rows parsed from one upload
#[derive(Debug, Default)]
pub struct UploadBatch {
    pub farmers: Vec<NewFarmer>,
    /// Rows dropped for missing required values
    pub skipped: usize,
}

/// Result of a completed upload
#[derive(Debug)]
pub struct IngestOutcome {
    pub rows_upserted: u64,
    /// Whatever the ML service answered for the forwarded file
    pub ml_upload: Value,
}

/// Parse farmer rows from CSV with a header row
///
/// Headers and fields are whitespace-trimmed. Records may be shorter or
/// longer than the header. Only an unreadable header (or an I/O failure)
/// is an error; a record that fails to decode counts as skipped.
pub fn parse_farmers<R: Read>(reader: R) -> Result<UploadBatch, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let columns = REQUIRED_COLUMNS.map(|name| headers.iter().position(|h| h == name));

    let mut batch = UploadBatch::default();
    for record in reader.byte_records() {
        let record = match record {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e),
            Err(e) => {
                debug!("Skipping unreadable record: {}", e);
                batch.skipped += 1;
                continue;
            }
        };

        let farmer = StringRecord::from_byte_record(record)
            .ok()
            .and_then(|record| farmer_from_record(&record, &columns));
        match farmer {
            Some(farmer) => batch.farmers.push(farmer),
            None => batch.skipped += 1,
        }
    }

    Ok(batch)
}

fn farmer_from_record(record: &StringRecord, columns: &[Option<usize>; 5]) -> Option<NewFarmer> {
    let mut values = [""; 5];
    for (value, column) in values.iter_mut().zip(columns) {
        *value = column.and_then(|i| record.get(i)).filter(|v| !v.is_empty())?;
    }
    let [farmer_id, village, latitude, longitude, load_kg] = values;

    Some(NewFarmer {
        farmer_id: farmer_id.to_string(),
        village: village.to_string(),
        latitude: parse_number(latitude),
        longitude: parse_number(longitude),
        load_kg: parse_number(load_kg),
    })
}

fn parse_number(value: &str) -> f64 {
    value.parse().unwrap_or(f64::NAN)
}

/// Ingest an uploaded CSV stored at `path`
///
/// The upsert batch commits before the ML service is contacted; a forwarding
/// failure is reported but the committed rows stay.
pub async fn ingest_csv(
    pool: &SqlitePool,
    ml: &dyn MlService,
    file_name: &str,
    path: &Path,
) -> ApiResult<IngestOutcome> {
    let contents = tokio::fs::read(path)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to read upload: {}", e)))?;

    let batch = parse_farmers(contents.as_slice())
        .map_err(|e| ApiError::BadRequest(format!("Invalid CSV: {}", e)))?;
    if batch.skipped > 0 {
        debug!(file = %file_name, skipped = batch.skipped, "Skipped rows with missing fields");
    }

    let rows_upserted = farmers::upsert_batch(pool, &batch.farmers).await?;
    info!(file = %file_name, rows = rows_upserted, "Farmer rows upserted");

    let ml_upload = ml
        .upload_training_data(file_name, contents)
        .await
        .map_err(|e| {
            ApiError::Internal(format!(
                "{} rows saved but forwarding to ML service failed: {}",
                rows_upserted, e
            ))
        })?;

    Ok(IngestOutcome {
        rows_upserted,
        ml_upload,
    })
}
