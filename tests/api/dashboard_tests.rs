//! Tests for the manager and super-admin screens.

use crate::common::*;
use axum::http::StatusCode;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test]
async fn empty_manager_dashboard() {
    let world = World::new().await;

    let response = world.client.get("/api/manager/dashboard").await;

    assert_success(&response, StatusCode::OK);
    assert_eq!(response.data()["activeCars"], 0);
    assert_eq!(response.data()["retrieving"], 0);
    assert_eq!(response.data()["totalToday"], 0);
    assert_eq!(response.data()["revenue"], "0");
    assert!(response.data()["assignments"].as_array().unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn manager_dashboard_tracks_parked_and_retrieving_cars() {
    let world = World::new().await;
    let session_id = world.park_at("C-3").await;
    world.pay(&session_id).await;

    let parked = world.client.get("/api/manager/dashboard").await;

    assert_eq!(parked.data()["activeCars"], 1);
    assert_eq!(parked.data()["totalToday"], 1);
    assert_eq!(parked.data()["revenue"], "150");
    assert_eq!(parked.data()["assignments"][0]["parking_spot"], "C-3");
    assert_eq!(parked.data()["assignments"][0]["users"]["name"], "Demo User");

    world
        .client
        .post(
            "/api/request-retrieval",
            json!({ "session_id": session_id, "user_id": world.customer_id }),
        )
        .await;
    let retrieving = world.client.get("/api/manager/dashboard").await;

    assert_eq!(retrieving.data()["activeCars"], 0);
    assert_eq!(retrieving.data()["retrieving"], 1);
    assert_eq!(retrieving.data()["revenue"], "150");
}

#[rstest]
#[tokio::test]
async fn parking_history_lists_completed_sessions() {
    let world = World::new().await;
    let session_id = world.park_at("A-1").await;
    world.pay(&session_id).await;
    world
        .client
        .post("/api/complete-parking-session", json!({ "session_id": session_id }))
        .await;
    world.request_parking().await;

    let response = world.client.get("/api/parking-history").await;

    assert_success(&response, StatusCode::OK);
    assert_eq!(response.data()["totalBookings"], 1);
    assert_eq!(response.data()["history"][0]["id"], session_id.as_str());
}

#[rstest]
#[case("", 2)]
#[case("?status=all", 2)]
#[case("?status=active", 1)]
#[case("?status=pending", 1)]
#[case("?status=completed", 0)]
#[tokio::test]
async fn sessions_filter_by_status(#[case] query: &str, #[case] expected: usize) {
    let world = World::new().await;
    let second_vehicle = world.add_vehicle("MH 04 CD 5678").await;
    world.park_at("A-1").await;
    world.request_parking_for(&second_vehicle).await;

    let response = world
        .client
        .get(&format!("/api/parking-sessions{query}"))
        .await;

    assert_success(&response, StatusCode::OK);
    assert_eq!(response.data().as_array().unwrap().len(), expected);
}

#[rstest]
#[tokio::test]
async fn unknown_status_is_bad_request() {
    let world = World::new().await;

    let response = world.client.get("/api/parking-sessions?status=parked").await;

    assert_api_error(&response, "INVALID_STATUS", StatusCode::BAD_REQUEST);
}

#[rstest]
#[tokio::test]
async fn super_admin_dashboard_counts_everything() {
    let world = World::new().await;
    let second_vehicle = world.add_vehicle("MH 04 CD 5678").await;
    let session_id = world.park_at("A-1").await;
    world.pay(&session_id).await;
    world.request_parking_for(&second_vehicle).await;

    let response = world.client.get("/api/super-admin/dashboard").await;

    assert_success(&response, StatusCode::OK);
    let data = response.data();
    assert_eq!(data["todayPerformance"]["ticketsIssued"], 2);
    assert_eq!(data["todayPerformance"]["collection"], "150");
    assert_eq!(data["statistics"]["totalTickets"], 2);
    assert_eq!(data["statistics"]["totalCollection"], "150");
    assert_eq!(data["statistics"]["activeParking"], 1);
    assert_eq!(data["sites"].as_array().unwrap().len(), 1);
}

#[rstest]
#[tokio::test]
async fn super_admin_dashboard_scopes_to_site() {
    let world = World::new().await;
    world.park_at("A-1").await;

    let scoped = world
        .client
        .get(&format!("/api/super-admin/dashboard?siteId={}", world.site_id))
        .await;
    let elsewhere = world
        .client
        .get(&format!("/api/super-admin/dashboard?siteId={}", unknown_id()))
        .await;

    assert_eq!(scoped.data()["statistics"]["totalTickets"], 1);
    assert_eq!(scoped.data()["sites"][0]["id"], world.site_id.as_str());
    assert_eq!(elsewhere.data()["statistics"]["totalTickets"], 0);
    assert!(elsewhere.data()["sites"].as_array().unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn malformed_site_scope_is_bad_request() {
    let world = World::new().await;

    let response = world
        .client
        .get("/api/super-admin/dashboard?siteId=mall")
        .await;

    assert_api_error(&response, "INVALID_ID", StatusCode::BAD_REQUEST);
}
