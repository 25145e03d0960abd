//! Domain errors for the valet workflow.
//!
//! Every rule violated by a state transition is a variant here. Variants
//! carry enough context for the API layer to build a useful message; the
//! mapping to HTTP status codes goes through [`DomainError::kind`].

use lambars::control::Either;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::identifiers::{SiteId, UserId, VehicleId};
use crate::domain::status::{AssignmentStatus, AssignmentType, SessionStatus};

/// Errors raised by pure domain transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// The vehicle is registered to a different customer.
    #[error("Vehicle {vehicle_id} does not belong to user {user_id}")]
    VehicleNotOwned {
        /// The vehicle in the request.
        vehicle_id: VehicleId,
        /// The customer in the request.
        user_id: UserId,
    },

    /// The site has no free slot left.
    #[error("Parking site {0} has no available slots")]
    SiteFull(SiteId),

    /// The vehicle already has a session that is not completed.
    #[error("Vehicle {0} already has an open parking session")]
    VehicleInSession(VehicleId),

    /// A session was asked to move to a state it cannot reach.
    #[error("Parking session cannot move from {from} to {to}")]
    InvalidSessionTransition {
        /// The current status.
        from: SessionStatus,
        /// The requested status.
        to: SessionStatus,
    },

    /// An assignment was asked to move to a state it cannot reach.
    #[error("Valet assignment cannot move from {from} to {to}")]
    InvalidAssignmentTransition {
        /// The current status.
        from: AssignmentStatus,
        /// The requested status.
        to: AssignmentStatus,
    },

    /// A park run was completed as a retrieval or vice versa.
    #[error("Expected a {expected} assignment but found a {actual} assignment")]
    AssignmentTypeMismatch {
        /// The type the operation handles.
        expected: AssignmentType,
        /// The stored type.
        actual: AssignmentType,
    },

    /// The user accepting an assignment is not a driver.
    #[error("User {0} is not a driver")]
    NotADriver(UserId),

    /// The driver is marked unavailable.
    #[error("Driver {0} is not available")]
    DriverUnavailable(UserId),

    /// The session belongs to a different customer.
    #[error("Parking session does not belong to user {0}")]
    SessionNotOwned(UserId),

    /// Retrieval or check-out attempted before payment.
    #[error("Payment required before retrieval")]
    PaymentRequired,

    /// The session fee was already settled.
    #[error("Parking session is already paid")]
    AlreadyPaid,

    /// The payment amount is zero, negative or missing.
    #[error("Invalid payment amount: {0}")]
    InvalidAmount(Decimal),

    /// A submitted field failed validation.
    #[error("Invalid {field}: {reason}")]
    InvalidField {
        /// The offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Outcome of a workflow: `Right` carries the rows to write, `Left` the
/// rule that was broken.
pub type DomainResult<T> = Either<DomainError, T>;

/// Coarse category of a domain error, used for HTTP mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainErrorKind {
    /// The request itself is malformed.
    Invalid,
    /// The request is well formed but money is owed first.
    PaymentRequired,
    /// The request conflicts with the current state.
    Conflict,
    /// The caller may not act on this record.
    Forbidden,
}

impl DomainError {
    /// Builds an [`DomainError::InvalidField`] error.
    #[must_use]
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> DomainErrorKind {
        match self {
            Self::InvalidAmount(_) | Self::InvalidField { .. } => DomainErrorKind::Invalid,
            Self::PaymentRequired => DomainErrorKind::PaymentRequired,
            Self::VehicleNotOwned { .. } | Self::SessionNotOwned(_) | Self::NotADriver(_) => {
                DomainErrorKind::Forbidden
            }
            Self::SiteFull(_)
            | Self::VehicleInSession(_)
            | Self::InvalidSessionTransition { .. }
            | Self::InvalidAssignmentTransition { .. }
            | Self::AssignmentTypeMismatch { .. }
            | Self::DriverUnavailable(_)
            | Self::AlreadyPaid => DomainErrorKind::Conflict,
        }
    }

    /// Returns a stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::VehicleNotOwned { .. } => "VEHICLE_NOT_OWNED",
            Self::SiteFull(_) => "SITE_FULL",
            Self::VehicleInSession(_) => "VEHICLE_IN_SESSION",
            Self::InvalidSessionTransition { .. } => "INVALID_SESSION_TRANSITION",
            Self::InvalidAssignmentTransition { .. } => "INVALID_ASSIGNMENT_TRANSITION",
            Self::AssignmentTypeMismatch { .. } => "ASSIGNMENT_TYPE_MISMATCH",
            Self::NotADriver(_) => "NOT_A_DRIVER",
            Self::DriverUnavailable(_) => "DRIVER_UNAVAILABLE",
            Self::SessionNotOwned(_) => "SESSION_NOT_OWNED",
            Self::PaymentRequired => "PAYMENT_REQUIRED",
            Self::AlreadyPaid => "ALREADY_PAID",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidField { .. } => "VALIDATION_ERROR",
        }
    }
}
