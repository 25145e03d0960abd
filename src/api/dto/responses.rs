//! Response envelopes.

use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;

/// Successful response: `{ "success": true, "data": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }

    /// `200 OK` with `data`.
    #[must_use]
    pub const fn ok(data: T) -> Json<Self> {
        Json(Self::new(data))
    }

    /// `201 Created` with `data`.
    #[must_use]
    pub const fn created(data: T) -> (StatusCode, Json<Self>) {
        (StatusCode::CREATED, Json(Self::new(data)))
    }
}

/// Failed response: `{ "success": false, "error": ..., "code": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            code: code.into(),
        }
    }
}

/// Body of `DELETE` responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    /// Service status ("healthy").
    pub status: String,
    /// Crate version.
    pub version: String,
}
