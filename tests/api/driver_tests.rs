//! Tests for driver accounts and the run queue.

use crate::common::*;
use axum::http::StatusCode;
use rstest::rstest;
use serde_json::json;

// =============================================================================
// Accounts
// =============================================================================

#[rstest]
#[tokio::test]
async fn created_driver_is_available() {
    let world = World::new().await;

    let response = world
        .client
        .get(&format!("/api/driver/{}", world.driver_id))
        .await;

    assert_success(&response, StatusCode::OK);
    assert_eq!(response.data()["role"], "driver");
    assert_eq!(response.data()["is_available"], true);
}

#[rstest]
#[tokio::test]
async fn customer_is_not_a_driver() {
    let world = World::new().await;

    let response = world
        .client
        .get(&format!("/api/driver/{}", world.customer_id))
        .await;

    assert_api_error(&response, "NOT_FOUND", StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn drivers_are_listed_newest_first() {
    let world = World::new().await;
    world
        .client
        .post(
            "/api/drivers",
            json!({ "name": "Anil", "email": "anil@example.com" }),
        )
        .await;

    let response = world.client.get("/api/drivers").await;

    let drivers = response.data().as_array().unwrap();
    assert_eq!(drivers.len(), 2);
    assert_eq!(drivers[0]["name"], "Anil");
    assert_eq!(drivers[1]["name"], "Ravi Kumar");
}

#[rstest]
#[tokio::test]
async fn duplicate_driver_email_is_conflict() {
    let world = World::new().await;

    let response = world
        .client
        .post(
            "/api/drivers",
            json!({ "name": "Ravi", "email": "RAVI@example.com" }),
        )
        .await;

    assert_api_error(&response, "DUPLICATE", StatusCode::CONFLICT);
    assert_eq!(
        response.body["error"],
        "An account with that email already exists."
    );
}

#[rstest]
#[case(json!({ "name": "", "email": "a@example.com" }))]
#[case(json!({ "name": "Anil", "email": "anil" }))]
#[case(json!({ "name": "Anil", "email": "anil@example.com", "phone": "call me" }))]
#[tokio::test]
async fn invalid_driver_is_rejected(#[case] body: serde_json::Value) {
    let world = World::new().await;

    let response = world.client.post("/api/drivers", body).await;

    assert_api_error(&response, "VALIDATION_ERROR", StatusCode::BAD_REQUEST);
}

#[rstest]
#[tokio::test]
async fn driver_can_go_off_duty() {
    let world = World::new().await;

    let response = world
        .client
        .put(
            &format!("/api/drivers/{}", world.driver_id),
            json!({ "is_available": false }),
        )
        .await;

    assert_success(&response, StatusCode::OK);
    assert_eq!(response.data()["is_available"], false);
    assert_eq!(response.data()["name"], "Ravi Kumar");
}

#[rstest]
#[tokio::test]
async fn idle_driver_can_be_deleted() {
    let world = World::new().await;

    let deleted = world
        .client
        .delete(&format!("/api/drivers/{}", world.driver_id))
        .await;
    let listed = world.client.get("/api/drivers").await;

    assert_success(&deleted, StatusCode::OK);
    assert_eq!(deleted.data()["message"], "Driver deleted successfully");
    assert!(listed.data().as_array().unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn driver_with_runs_cannot_be_deleted() {
    let world = World::new().await;
    world.park_at("A-1").await;

    let response = world
        .client
        .delete(&format!("/api/drivers/{}", world.driver_id))
        .await;

    assert_api_error(&response, "IN_USE", StatusCode::CONFLICT);
}

// =============================================================================
// Run Queue
// =============================================================================

#[rstest]
#[tokio::test]
async fn run_is_accepted_once() {
    let world = World::new().await;
    let opened = world.request_parking().await;
    let assignment_id = opened.data()["assignment"]["id"].as_str().unwrap().to_string();
    let second = world
        .client
        .post(
            "/api/drivers",
            json!({ "name": "Anil", "email": "anil@example.com" }),
        )
        .await
        .id();

    let first = world.accept(&assignment_id).await;
    let late = world
        .client
        .post(
            &format!("/api/driver/accept/{assignment_id}"),
            json!({ "driver_id": second }),
        )
        .await;

    assert_success(&first, StatusCode::OK);
    assert_api_error(&late, "INVALID_ASSIGNMENT_TRANSITION", StatusCode::CONFLICT);
    let queue = world.client.get("/api/driver/requests").await;
    assert!(queue.data().as_array().unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn customer_cannot_accept_runs() {
    let world = World::new().await;
    let opened = world.request_parking().await;
    let assignment_id = opened.data()["assignment"]["id"].as_str().unwrap().to_string();

    let response = world
        .client
        .post(
            &format!("/api/driver/accept/{assignment_id}"),
            json!({ "driver_id": world.customer_id }),
        )
        .await;

    assert_api_error(&response, "NOT_A_DRIVER", StatusCode::FORBIDDEN);
}

#[rstest]
#[tokio::test]
async fn off_duty_driver_cannot_accept() {
    let world = World::new().await;
    let opened = world.request_parking().await;
    let assignment_id = opened.data()["assignment"]["id"].as_str().unwrap().to_string();
    world
        .client
        .put(
            &format!("/api/drivers/{}", world.driver_id),
            json!({ "is_available": false }),
        )
        .await;

    let response = world.accept(&assignment_id).await;

    assert_api_error(&response, "DRIVER_UNAVAILABLE", StatusCode::CONFLICT);
}

#[rstest]
#[tokio::test]
async fn unaccepted_run_cannot_be_completed() {
    let world = World::new().await;
    let opened = world.request_parking().await;
    let assignment_id = opened.data()["assignment"]["id"].as_str().unwrap().to_string();

    let response = world
        .client
        .post(
            "/api/driver/complete-parking",
            json!({ "assignment_id": assignment_id, "parking_spot": "A-1" }),
        )
        .await;

    assert_api_error(&response, "INVALID_ASSIGNMENT_TRANSITION", StatusCode::CONFLICT);
    assert_eq!(world.available_slots().await, 9);
}

#[rstest]
#[tokio::test]
async fn park_run_cannot_complete_as_retrieval() {
    let world = World::new().await;
    let opened = world.request_parking().await;
    let assignment_id = opened.data()["assignment"]["id"].as_str().unwrap().to_string();
    world.accept(&assignment_id).await;

    let response = world
        .client
        .post(
            "/api/driver/complete-retrieval",
            json!({ "assignment_id": assignment_id }),
        )
        .await;

    assert_api_error(&response, "ASSIGNMENT_TYPE_MISMATCH", StatusCode::CONFLICT);
}

#[rstest]
#[tokio::test]
async fn blank_spot_is_rejected() {
    let world = World::new().await;
    let opened = world.request_parking().await;
    let assignment_id = opened.data()["assignment"]["id"].as_str().unwrap().to_string();
    world.accept(&assignment_id).await;

    let response = world
        .client
        .post(
            "/api/driver/complete-parking",
            json!({ "assignment_id": assignment_id, "parking_spot": "  " }),
        )
        .await;

    assert_api_error(&response, "VALIDATION_ERROR", StatusCode::BAD_REQUEST);
}

#[rstest]
#[tokio::test]
async fn unknown_run_is_not_found() {
    let world = World::new().await;

    let response = world.accept(&unknown_id()).await;

    assert_api_error(&response, "NOT_FOUND", StatusCode::NOT_FOUND);
}
