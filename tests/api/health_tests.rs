//! Tests for `GET /` and `GET /health`.

use crate::common::*;
use axum::http::StatusCode;
use rstest::rstest;
use valet::api::create_router;
use valet::infrastructure::AppDependencies;

#[rstest]
#[tokio::test]
async fn health_is_healthy() {
    let client = TestClient::new(create_router(AppDependencies::in_memory()));

    let response = client.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["version"], env!("CARGO_PKG_VERSION"));
}

#[rstest]
#[tokio::test]
async fn root_greets() {
    let client = TestClient::new(create_router(AppDependencies::in_memory()));

    let response = client.get("/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.as_str().is_some_and(|text| text.starts_with("Welcome")));
}
