//! Assertion helpers for the response envelope.

use axum::http::StatusCode;

use super::client::TestResponse;

pub fn assert_success(response: &TestResponse, expected_status: StatusCode) {
    assert_eq!(
        response.status, expected_status,
        "Expected status {expected_status}, got {}: {}",
        response.status, response.body
    );
    assert_eq!(response.body["success"], true, "body: {}", response.body);
}

pub fn assert_api_error(response: &TestResponse, expected_code: &str, expected_status: StatusCode) {
    assert_eq!(
        response.status, expected_status,
        "Expected status {expected_status}, got {}: {}",
        response.status, response.body
    );
    assert_eq!(response.body["success"], false, "body: {}", response.body);
    assert_eq!(
        response.body["code"], expected_code,
        "Expected error code '{expected_code}', body: {}",
        response.body
    );
    assert!(
        response.body["error"].as_str().is_some_and(|message| !message.is_empty()),
        "error message missing: {}",
        response.body
    );
}
