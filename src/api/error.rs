//! API error type and its JSON envelope.
//!
//! Every failure renders as
//!
//! ```json
//! { "success": false, "error": "Requested item not found.", "code": "NOT_FOUND" }
//! ```
//!
//! Storage and database details never reach the client; they are logged
//! instead.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::api::dto::ErrorResponse;
use crate::application::ports::StoreError;
use crate::domain::{DomainError, DomainErrorKind, IdentifierError, ParseStatusError};

const PLATE_TAKEN: &str = "A vehicle with that plate number already exists.";
const EMAIL_TAKEN: &str = "An account with that email already exists.";
const PAYMENT_REQUIRED: &str = "Payment is required before retrieval.";
const NOT_FOUND: &str = "Requested item not found.";
const IN_USE: &str = "This record is still in use and cannot be deleted.";
const FALLBACK: &str = "Something went wrong. Please try again.";

// =============================================================================
// ApiError
// =============================================================================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidId(#[from] IdentifierError),

    #[error(transparent)]
    InvalidStatus(#[from] ParseStatusError),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self::Store(StoreError::Domain(error))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

// =============================================================================
// Query Methods
// =============================================================================

impl ApiError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidId(_) | Self::InvalidStatus(_) | Self::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::UniqueViolation { .. } | StoreError::InUse { .. }) => {
                StatusCode::CONFLICT
            }
            Self::Store(StoreError::Domain(error)) => match error.kind() {
                DomainErrorKind::Invalid => StatusCode::BAD_REQUEST,
                DomainErrorKind::PaymentRequired => StatusCode::PAYMENT_REQUIRED,
                DomainErrorKind::Forbidden => StatusCode::FORBIDDEN,
                DomainErrorKind::Conflict => StatusCode::CONFLICT,
            },
            Self::Store(StoreError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidId(_) => "INVALID_ID",
            Self::InvalidStatus(_) => "INVALID_STATUS",
            Self::InvalidBody(_) => "INVALID_BODY",
            Self::Store(StoreError::NotFound { .. }) => "NOT_FOUND",
            Self::Store(StoreError::UniqueViolation { .. }) => "DUPLICATE",
            Self::Store(StoreError::InUse { .. }) => "IN_USE",
            Self::Store(StoreError::Domain(error)) => error.code(),
            Self::Store(StoreError::Database(_)) => "DATABASE_ERROR",
        }
    }

    /// Message safe to show to end users.
    #[must_use]
    pub fn friendly_message(&self) -> String {
        match self {
            Self::Store(StoreError::NotFound { .. }) => NOT_FOUND.to_string(),
            Self::Store(StoreError::UniqueViolation { constraint }) => {
                if constraint.contains("email") {
                    EMAIL_TAKEN.to_string()
                } else {
                    PLATE_TAKEN.to_string()
                }
            }
            Self::Store(StoreError::InUse { .. }) => IN_USE.to_string(),
            Self::Store(StoreError::Domain(DomainError::PaymentRequired)) => {
                PAYMENT_REQUIRED.to_string()
            }
            Self::Store(StoreError::Database(_)) => FALLBACK.to_string(),
            other => other.to_string(),
        }
    }
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, code = self.error_code(), "request rejected");
        }

        let body = ErrorResponse::new(self.friendly_message(), self.error_code());
        (status_code, Json(body)).into_response()
    }
}
