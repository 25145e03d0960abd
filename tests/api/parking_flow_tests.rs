//! Tests for the customer and driver workflow end to end.

use crate::common::*;
use axum::http::StatusCode;
use rstest::rstest;
use serde_json::json;

// =============================================================================
// Full Lifecycle
// =============================================================================

#[rstest]
#[tokio::test]
async fn park_pay_and_retrieve() {
    let world = World::new().await;

    // Request
    let opened = world.request_parking().await;
    assert_success(&opened, StatusCode::CREATED);
    assert_eq!(opened.data()["session"]["status"], "pending");
    assert_eq!(opened.data()["session"]["payment_amount"], "150");
    assert_eq!(opened.data()["session"]["vehicles"]["plate_number"], "MH 02 AB 1234");
    assert_eq!(opened.data()["assignment"]["assignment_type"], "park");
    let session_id = opened.data()["session"]["id"].as_str().unwrap().to_string();
    let park_id = opened.data()["assignment"]["id"].as_str().unwrap().to_string();
    assert_eq!(world.available_slots().await, 9);

    // Queue and accept
    let queue = world.client.get("/api/driver/requests").await;
    assert_eq!(queue.data().as_array().unwrap().len(), 1);
    assert_eq!(queue.data()[0]["parking_sessions"]["id"], session_id.as_str());

    let accepted = world.accept(&park_id).await;
    assert_success(&accepted, StatusCode::OK);
    assert_eq!(accepted.data()["status"], "in_progress");
    assert_eq!(accepted.data()["driver_id"], world.driver_id.as_str());

    let active = world
        .client
        .get(&format!("/api/driver/{}/active", world.driver_id))
        .await;
    assert_eq!(active.data().as_array().unwrap().len(), 1);

    // Park
    let parked = world
        .client
        .post(
            "/api/driver/complete-parking",
            json!({ "assignment_id": park_id, "parking_spot": "B-12" }),
        )
        .await;
    assert_success(&parked, StatusCode::OK);
    assert_eq!(parked.data()["status"], "completed");
    assert_eq!(world.available_slots().await, 9);

    let current = world
        .client
        .get(&format!("/api/my-session/{}", world.customer_id))
        .await;
    assert_eq!(current.data()["status"], "active");
    assert_eq!(current.data()["parking_spot"], "B-12");
    assert_eq!(current.data()["valet_assignments"][0]["users"]["name"], "Ravi Kumar");

    // Retrieval needs payment first
    let refused = world
        .client
        .post(
            "/api/request-retrieval",
            json!({ "session_id": session_id, "user_id": world.customer_id }),
        )
        .await;
    assert_api_error(&refused, "PAYMENT_REQUIRED", StatusCode::PAYMENT_REQUIRED);
    assert_eq!(refused.body["error"], "Payment is required before retrieval.");

    let paid = world.pay(&session_id).await;
    assert_success(&paid, StatusCode::OK);
    assert_eq!(paid.data()["payment_status"], "paid");
    assert_eq!(paid.data()["payment_amount"], "150");
    assert_eq!(paid.data()["payment_method"], "test");
    assert_eq!(world.store.payment_count().await, 1);

    let retrieval = world
        .client
        .post(
            "/api/request-retrieval",
            json!({ "session_id": session_id, "user_id": world.customer_id }),
        )
        .await;
    assert_success(&retrieval, StatusCode::OK);
    assert_eq!(retrieval.data()["assignment_type"], "retrieve");
    let retrieve_id = retrieval.id();

    let current = world
        .client
        .get(&format!("/api/my-session/{}", world.customer_id))
        .await;
    assert_eq!(current.data()["status"], "retrieval_requested");

    // Hand back
    assert_success(&world.accept(&retrieve_id).await, StatusCode::OK);
    let returned = world
        .client
        .post(
            "/api/driver/complete-retrieval",
            json!({ "assignment_id": retrieve_id }),
        )
        .await;
    assert_success(&returned, StatusCode::OK);
    assert_eq!(world.available_slots().await, 10);

    let current = world
        .client
        .get(&format!("/api/my-session/{}", world.customer_id))
        .await;
    assert_success(&current, StatusCode::OK);
    assert!(current.data().is_null());

    let latest = world
        .client
        .get(&format!("/api/parking-session/{}", world.customer_id))
        .await;
    assert_eq!(latest.data()["status"], "completed");
    assert!(latest.data()["exit_time"].is_string());

    let history = world
        .client
        .get(&format!("/api/my-history/{}", world.customer_id))
        .await;
    assert_eq!(history.data().as_array().unwrap().len(), 1);
    assert_eq!(history.data()[0]["id"], session_id.as_str());
}

#[rstest]
#[tokio::test]
async fn paid_session_can_check_out() {
    let world = World::new().await;
    let session_id = world.park_at("A-1").await;
    world.pay(&session_id).await;

    let response = world
        .client
        .post("/api/complete-parking-session", json!({ "sessionId": session_id }))
        .await;

    assert_success(&response, StatusCode::OK);
    assert_eq!(response.data()["status"], "completed");
    assert_eq!(world.available_slots().await, 10);
}

#[rstest]
#[tokio::test]
async fn unpaid_session_cannot_check_out() {
    let world = World::new().await;
    let session_id = world.park_at("A-1").await;

    let response = world
        .client
        .post("/api/complete-parking-session", json!({ "session_id": session_id }))
        .await;

    assert_api_error(&response, "PAYMENT_REQUIRED", StatusCode::PAYMENT_REQUIRED);
}

// =============================================================================
// Edge Cases
// =============================================================================

#[rstest]
#[tokio::test]
async fn my_session_is_null_without_sessions() {
    let world = World::new().await;

    let response = world
        .client
        .get(&format!("/api/my-session/{}", world.customer_id))
        .await;

    assert_success(&response, StatusCode::OK);
    assert!(response.data().is_null());
}

#[rstest]
#[tokio::test]
async fn full_site_rejects_requests() {
    let world = World::with_slots(0).await;

    let response = world.request_parking().await;

    assert_api_error(&response, "SITE_FULL", StatusCode::CONFLICT);
}

#[rstest]
#[tokio::test]
async fn pending_request_holds_the_last_slot() {
    let world = World::with_slots(1).await;
    let second_vehicle = world.add_vehicle("MH 04 CD 5678").await;

    let first = world.request_parking().await;
    let second = world.request_parking_for(&second_vehicle).await;

    assert_success(&first, StatusCode::CREATED);
    assert_api_error(&second, "SITE_FULL", StatusCode::CONFLICT);
    assert_eq!(world.available_slots().await, 0);
}

#[rstest]
#[tokio::test]
async fn concurrent_requests_share_the_last_slot() {
    let world = World::with_slots(1).await;
    let second_vehicle = world.add_vehicle("MH 04 CD 5678").await;

    let (first, second) = tokio::join!(
        world.request_parking(),
        world.request_parking_for(&second_vehicle),
    );

    let created = [&first, &second]
        .iter()
        .filter(|response| response.status == StatusCode::CREATED)
        .count();
    let refused = if first.status == StatusCode::CREATED { &second } else { &first };
    assert_eq!(created, 1);
    assert_api_error(refused, "SITE_FULL", StatusCode::CONFLICT);
    assert_eq!(world.available_slots().await, 0);
}

#[rstest]
#[tokio::test]
async fn freed_slot_goes_to_the_next_request() {
    let world = World::with_slots(1).await;
    let second_vehicle = world.add_vehicle("MH 04 CD 5678").await;
    let session_id = world.park_at("A-1").await;
    world.pay(&session_id).await;

    let refused = world.request_parking_for(&second_vehicle).await;
    world
        .client
        .post("/api/complete-parking-session", json!({ "session_id": session_id }))
        .await;
    let accepted = world.request_parking_for(&second_vehicle).await;

    assert_api_error(&refused, "SITE_FULL", StatusCode::CONFLICT);
    assert_success(&accepted, StatusCode::CREATED);
    assert_eq!(world.available_slots().await, 0);
}

#[rstest]
#[tokio::test]
async fn vehicle_cannot_be_requested_twice() {
    let world = World::new().await;
    world.request_parking().await;

    let again = world.request_parking().await;

    assert_api_error(&again, "VEHICLE_IN_SESSION", StatusCode::CONFLICT);
    assert_eq!(world.available_slots().await, 9);
}

#[rstest]
#[tokio::test]
async fn vehicle_can_return_after_check_out() {
    let world = World::new().await;
    let session_id = world.park_at("A-1").await;
    world.pay(&session_id).await;
    world
        .client
        .post("/api/complete-parking-session", json!({ "session_id": session_id }))
        .await;

    let again = world.request_parking().await;

    assert_success(&again, StatusCode::CREATED);
    assert_eq!(world.available_slots().await, 9);
}

#[rstest]
#[tokio::test]
async fn someone_elses_vehicle_is_forbidden() {
    let world = World::new().await;
    let other = customer(&world.store, "other@example.com").await;

    let response = world
        .client
        .post(
            "/api/parking-request",
            json!({
                "user_id": other.id.to_string(),
                "vehicle_id": world.vehicle_id,
                "site_id": world.site_id,
            }),
        )
        .await;

    assert_api_error(&response, "VEHICLE_NOT_OWNED", StatusCode::FORBIDDEN);
}

#[rstest]
#[tokio::test]
async fn unknown_site_is_not_found() {
    let world = World::new().await;

    let response = world
        .client
        .post(
            "/api/parking-request",
            json!({
                "user_id": world.customer_id,
                "vehicle_id": world.vehicle_id,
                "site_id": unknown_id(),
            }),
        )
        .await;

    assert_api_error(&response, "NOT_FOUND", StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn malformed_body_id_is_bad_request() {
    let world = World::new().await;

    let response = world
        .client
        .post(
            "/api/parking-request",
            json!({
                "user_id": world.customer_id,
                "vehicle_id": "car-1",
                "site_id": world.site_id,
            }),
        )
        .await;

    assert_api_error(&response, "INVALID_ID", StatusCode::BAD_REQUEST);
}

#[rstest]
#[tokio::test]
async fn second_payment_is_conflict() {
    let world = World::new().await;
    let session_id = world.park_at("A-1").await;
    world.pay(&session_id).await;

    let response = world.pay(&session_id).await;

    assert_api_error(&response, "ALREADY_PAID", StatusCode::CONFLICT);
    assert_eq!(world.store.payment_count().await, 1);
}

#[rstest]
#[tokio::test]
async fn explicit_amount_is_recorded() {
    let world = World::new().await;
    let session_id = world.park_at("A-1").await;

    let response = world
        .client
        .post(
            "/api/mock-payment",
            json!({ "session_id": session_id, "amount": "200.50" }),
        )
        .await;

    assert_success(&response, StatusCode::OK);
    assert_eq!(response.data()["payment_amount"], "200.50");
}

#[rstest]
#[case(json!(0))]
#[case(json!("-10"))]
#[tokio::test]
async fn non_positive_amount_is_rejected(#[case] amount: serde_json::Value) {
    let world = World::new().await;
    let session_id = world.park_at("A-1").await;

    let response = world
        .client
        .post(
            "/api/mock-payment",
            json!({ "session_id": session_id, "amount": amount }),
        )
        .await;

    assert_api_error(&response, "INVALID_AMOUNT", StatusCode::BAD_REQUEST);
}

#[rstest]
#[tokio::test]
async fn retrieval_of_someone_elses_session_is_forbidden() {
    let world = World::new().await;
    let session_id = world.park_at("A-1").await;
    world.pay(&session_id).await;
    let other = customer(&world.store, "other@example.com").await;

    let response = world
        .client
        .post(
            "/api/request-retrieval",
            json!({ "session_id": session_id, "user_id": other.id.to_string() }),
        )
        .await;

    assert_api_error(&response, "SESSION_NOT_OWNED", StatusCode::FORBIDDEN);
}

#[rstest]
#[tokio::test]
async fn retrieval_before_parking_is_conflict() {
    let world = World::new().await;
    let opened = world.request_parking().await;
    let session_id = opened.data()["session"]["id"].as_str().unwrap().to_string();
    world.pay(&session_id).await;

    let response = world
        .client
        .post(
            "/api/request-retrieval",
            json!({ "session_id": session_id, "user_id": world.customer_id }),
        )
        .await;

    assert_api_error(&response, "INVALID_SESSION_TRANSITION", StatusCode::CONFLICT);
}
