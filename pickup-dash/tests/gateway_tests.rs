//! Integration tests for the HTTP ML Gateway
//!
//! A throwaway axum server on 127.0.0.1 plays the ML service so the real
//! wire format (multipart upload, form-encoded parameters, CSV download)
//! is exercised end to end.

use axum::{
    body::Body,
    extract::{Form, Multipart},
    http::{Request, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use pickup_common::db::farmers::{list_farmers, upsert_batch, FARMER_LIST_LIMIT};
use pickup_common::db::{init_memory_database, NewFarmer};
use pickup_dash::ml::{HttpMlGateway, MlError, MlService};
use pickup_dash::{build_router, AppState};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

const ASSIGNMENTS_CSV: &str = "farmer_id,village,cluster,assigned_truck_x\n\
                               F1,Alpha,0,TRUCK-1\n\
                               F2,Beta,1,TRUCK-2\n";

/// Start a mock ML service and return its base URL
async fn spawn_mock(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn mock_upload(mut multipart: Multipart) -> Json<Value> {
    let mut received = json!({});
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let text = field.text().await.unwrap();
        received = json!({
            "field": name,
            "file_name": file_name,
            "content_type": content_type,
            "contents": text,
        });
    }
    Json(received)
}

async fn mock_train(Form(form): Form<HashMap<String, String>>) -> Json<Value> {
    Json(json!({ "message": "trained", "k_received": form.get("k") }))
}

async fn mock_assign(Form(form): Form<HashMap<String, String>>) -> Json<Value> {
    Json(json!({ "message": "assigned", "capacity_received": form.get("capacity") }))
}

async fn mock_download() -> impl IntoResponse {
    ([("content-type", "text/csv")], ASSIGNMENTS_CSV)
}

fn healthy_ml_service() -> Router {
    Router::new()
        .route("/upload", post(mock_upload))
        .route("/train", post(mock_train))
        .route("/assign", post(mock_assign))
        .route("/download/assignments", get(mock_download))
}

fn failing_ml_service() -> Router {
    Router::new()
        .route(
            "/train",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "detail": "Upload data first" })),
                )
            }),
        )
        .route(
            "/assign",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "busy") }),
        )
        .route("/upload", post(|| async { "not json" }))
}

fn gateway(base_url: &str) -> HttpMlGateway {
    HttpMlGateway::new(base_url, Duration::from_secs(5)).expect("Should create gateway")
}

#[tokio::test]
async fn test_upload_sends_multipart_file() {
    let base_url = spawn_mock(healthy_ml_service()).await;
    let ml = gateway(&base_url);

    let csv = "farmer_id,village,latitude,longitude,load_kg\nF1,Alpha,1,2,3\n";
    let response = ml
        .upload_training_data("batch.csv", csv.as_bytes().to_vec())
        .await
        .unwrap();

    assert_eq!(response["field"], "file");
    assert_eq!(response["file_name"], "batch.csv");
    assert_eq!(response["content_type"], "text/csv");
    assert_eq!(response["contents"], csv);
}

#[tokio::test]
async fn test_train_and_assign_send_form_fields() {
    let base_url = spawn_mock(healthy_ml_service()).await;
    let ml = gateway(&base_url);

    let response = ml.train(7).await.unwrap();
    assert_eq!(response["k_received"], "7");

    let response = ml.request_assignment(5000.0).await.unwrap();
    assert_eq!(response["capacity_received"], "5000");

    let response = ml.request_assignment(2500.5).await.unwrap();
    assert_eq!(response["capacity_received"], "2500.5");
}

#[tokio::test]
async fn test_fetch_assignments_returns_csv_text() {
    let base_url = spawn_mock(healthy_ml_service()).await;
    let ml = gateway(&format!("{}/", base_url));

    assert_eq!(ml.fetch_assignments().await.unwrap(), ASSIGNMENTS_CSV);
}

#[tokio::test]
async fn test_upstream_errors_carry_status_and_body() {
    let base_url = spawn_mock(failing_ml_service()).await;
    let ml = gateway(&base_url);

    match ml.train(3).await {
        Err(MlError::Upstream { status, body }) => {
            assert_eq!(status, 400);
            assert!(body.contains("Upload data first"));
        }
        other => panic!("Expected upstream error, got {:?}", other),
    }

    let err = ml.request_assignment(100.0).await.unwrap_err();
    assert_eq!(err.status(), Some(503));

    let err = ml.upload_training_data("a.csv", b"x".to_vec()).await.unwrap_err();
    assert!(matches!(err, MlError::Parse(_)), "got {:?}", err);

    // Route missing on the mock
    let err = ml.fetch_assignments().await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let ml = gateway(&format!("http://{}", addr));
    let err = ml.train(5).await.unwrap_err();
    assert!(matches!(err, MlError::Network(_)), "got {:?}", err);
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_assign_endpoint_end_to_end() {
    let base_url = spawn_mock(healthy_ml_service()).await;
    let pool = init_memory_database().await.unwrap();
    upsert_batch(
        &pool,
        &[
            NewFarmer {
                farmer_id: "F1".to_string(),
                village: "Alpha".to_string(),
                latitude: 1.0,
                longitude: 2.0,
                load_kg: 100.0,
            },
            NewFarmer {
                farmer_id: "F2".to_string(),
                village: "Beta".to_string(),
                latitude: 3.0,
                longitude: 4.0,
                load_kg: 200.0,
            },
        ],
    )
    .await
    .unwrap();

    let app = build_router(AppState::new(pool.clone(), Arc::new(gateway(&base_url))));
    let request = Request::builder()
        .method("POST")
        .uri("/api/assign")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"capacity": 4000}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let farmers = list_farmers(&pool, FARMER_LIST_LIMIT).await.unwrap();
    assert_eq!(farmers[0].cluster, Some(0));
    assert_eq!(farmers[0].assigned_truck.as_deref(), Some("TRUCK-1"));
    assert_eq!(farmers[1].cluster, Some(1));
    assert_eq!(farmers[1].assigned_truck.as_deref(), Some("TRUCK-2"));
}

#[tokio::test]
async fn test_train_endpoint_relays_upstream_status() {
    let base_url = spawn_mock(failing_ml_service()).await;
    let pool = init_memory_database().await.unwrap();
    let app = build_router(AppState::new(pool, Arc::new(gateway(&base_url))));

    let request = Request::builder()
        .method("POST")
        .uri("/api/train")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"k": 3}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Training failed");
    assert_eq!(body["details"]["detail"], "Upload data first");
}
