//! Tests for sites, profiles and vehicle maintenance.

use crate::common::*;
use axum::http::StatusCode;
use rstest::rstest;
use serde_json::json;

// =============================================================================
// Sites and Profile
// =============================================================================

#[rstest]
#[tokio::test]
async fn sites_are_listed() {
    let world = World::new().await;

    let response = world.client.get("/api/sites").await;

    assert_success(&response, StatusCode::OK);
    assert_eq!(response.data().as_array().unwrap().len(), 1);
    assert_eq!(response.data()[0]["name"], "Inorbit Mall");
    assert_eq!(response.data()[0]["fixed_parking_fee"], "150");
}

#[rstest]
#[tokio::test]
async fn profile_is_returned() {
    let world = World::new().await;

    let response = world
        .client
        .get(&format!("/api/users/{}/profile", world.customer_id))
        .await;

    assert_success(&response, StatusCode::OK);
    assert_eq!(response.data()["email"], "demo@example.com");
    assert_eq!(response.data()["role"], "user");
}

#[rstest]
#[tokio::test]
async fn unknown_profile_is_not_found() {
    let world = World::new().await;

    let response = world
        .client
        .get(&format!("/api/users/{}/profile", unknown_id()))
        .await;

    assert_api_error(&response, "NOT_FOUND", StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "Requested item not found.");
}

#[rstest]
#[case("not-a-uuid")]
#[case("12345")]
#[tokio::test]
async fn malformed_user_id_is_bad_request(#[case] user_id: &str) {
    let world = World::new().await;

    let response = world
        .client
        .get(&format!("/api/users/{user_id}/profile"))
        .await;

    assert_api_error(&response, "INVALID_ID", StatusCode::BAD_REQUEST);
}

// =============================================================================
// Vehicles
// =============================================================================

#[rstest]
#[tokio::test]
async fn created_vehicle_is_listed() {
    let world = World::new().await;

    let response = world
        .client
        .get(&format!("/api/users/{}/vehicles", world.customer_id))
        .await;

    assert_success(&response, StatusCode::OK);
    let vehicles = response.data().as_array().unwrap();
    assert_eq!(vehicles.len(), 1);
    assert_eq!(vehicles[0]["plate_number"], "MH 02 AB 1234");
    assert_eq!(vehicles[0]["vehicle_type"], "sedan");
}

#[rstest]
#[tokio::test]
async fn duplicate_plate_is_conflict() {
    let world = World::new().await;
    let other = customer(&world.store, "other@example.com").await;

    let response = world
        .client
        .post(
            &format!("/api/users/{}/vehicles", other.id),
            json!({ "vehicle_name": "Swift", "plate_number": "mh 02  ab 1234" }),
        )
        .await;

    assert_api_error(&response, "DUPLICATE", StatusCode::CONFLICT);
    assert_eq!(
        response.body["error"],
        "A vehicle with that plate number already exists."
    );
}

#[rstest]
#[tokio::test]
async fn missing_plate_is_validation_error() {
    let world = World::new().await;

    let response = world
        .client
        .post(
            &format!("/api/users/{}/vehicles", world.customer_id),
            json!({ "vehicle_name": "Swift" }),
        )
        .await;

    assert_api_error(&response, "VALIDATION_ERROR", StatusCode::BAD_REQUEST);
}

#[rstest]
#[tokio::test]
async fn vehicle_for_unknown_user_is_not_found() {
    let world = World::new().await;

    let response = world
        .client
        .post(
            &format!("/api/users/{}/vehicles", unknown_id()),
            json!({ "vehicle_name": "Swift", "plate_number": "MH 04 CD 5678" }),
        )
        .await;

    assert_api_error(&response, "NOT_FOUND", StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn malformed_json_is_bad_request() {
    let world = World::new().await;

    let response = world
        .client
        .post_raw(
            &format!("/api/users/{}/vehicles", world.customer_id),
            "{\"vehicle_name\": ",
        )
        .await;

    assert_api_error(&response, "INVALID_BODY", StatusCode::BAD_REQUEST);
}

#[rstest]
#[tokio::test]
async fn update_changes_only_given_fields() {
    let world = World::new().await;

    let response = world
        .client
        .put(
            &format!("/api/vehicles/{}", world.vehicle_id),
            json!({ "vehicle_type": "suv" }),
        )
        .await;

    assert_success(&response, StatusCode::OK);
    assert_eq!(response.data()["vehicle_type"], "suv");
    assert_eq!(response.data()["vehicle_name"], "Honda City");
}

#[rstest]
#[tokio::test]
async fn unused_vehicle_can_be_deleted() {
    let world = World::new().await;

    let deleted = world
        .client
        .delete(&format!("/api/vehicles/{}", world.vehicle_id))
        .await;
    let listed = world
        .client
        .get(&format!("/api/users/{}/vehicles", world.customer_id))
        .await;

    assert_success(&deleted, StatusCode::OK);
    assert_eq!(deleted.data()["id"], world.vehicle_id.as_str());
    assert!(listed.data().as_array().unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn vehicle_with_history_cannot_be_deleted() {
    let world = World::new().await;
    world.request_parking().await;

    let response = world
        .client
        .delete(&format!("/api/vehicles/{}", world.vehicle_id))
        .await;

    assert_api_error(&response, "IN_USE", StatusCode::CONFLICT);
}
