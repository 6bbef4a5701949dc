//! pickup-dash library - farmer pickup dashboard service
//!
//! Ingests farmer CSVs into the Farmer Store, relays training and truck
//! assignment requests to the external ML service, and serves the dashboard.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use pickup_common::config::DEFAULT_MAX_UPLOAD_MB;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod error;
pub mod ingest;
pub mod ml;
pub mod reconcile;

pub use crate::error::{ApiError, ApiResult};
use crate::ml::MlService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Farmer Store connection pool
    pub db: SqlitePool,
    /// External clustering/assignment service
    pub ml: Arc<dyn MlService>,
    /// Request body cap for CSV uploads
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, ml: Arc<dyn MlService>) -> Self {
        Self {
            db,
            ml,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route("/api/upload-csv", post(api::upload_csv))
        .route("/api/train", post(api::train))
        .route("/api/assign", post(api::assign))
        .route("/api/farmers", get(api::list_farmers))
        .route("/api/stats", get(api::get_stats))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes));

    let ui = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .merge(api::health_routes());

    Router::new()
        .merge(api)
        .merge(ui)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
