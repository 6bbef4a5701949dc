//! ML Gateway: client side of the external clustering/assignment service
//!
//! The service owns k-means training and truck packing. This crate only
//! forwards training data, triggers training, and runs the two-phase
//! assignment protocol:
//! 1. [`MlService::request_assignment`] asks the service to compute truck
//!    assignments for the trained clusters
//! 2. [`MlService::fetch_assignments`] retrieves the resulting CSV document

use axum::async_trait;
use serde_json::Value;
use thiserror::Error;

mod gateway;

pub use gateway::HttpMlGateway;

/// ML service errors
#[derive(Debug, Error)]
pub enum MlError {
    /// Base URL could not be parsed
    #[error("Invalid ML service URL: {0}")]
    InvalidUrl(String),

    /// Connection, timeout, or transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Service answered with a non-success status
    #[error("ML service returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Response body was not what the contract promises
    #[error("Parse error: {0}")]
    Parse(String),
}

impl MlError {
    /// HTTP status reported by the service, if it answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            MlError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Collaborator interface to the external ML service
#[async_trait]
pub trait MlService: Send + Sync {
    /// Forward an uploaded CSV unmodified as training data
    async fn upload_training_data(&self, file_name: &str, contents: Vec<u8>)
        -> Result<Value, MlError>;

    /// Train the clustering model with `k` clusters (`k <= 0` lets the
    /// service pick k itself)
    async fn train(&self, k: i64) -> Result<Value, MlError>;

    /// Phase 1: compute truck assignments with the given truck capacity (kg)
    async fn request_assignment(&self, capacity: f64) -> Result<Value, MlError>;

    /// Phase 2: download the assignment result as CSV text
    async fn fetch_assignments(&self) -> Result<String, MlError>;
}
