//! Parking session aggregate.
//!
//! A session is one stay of one vehicle at one site. Its lifecycle is
//! strictly forward:
//!
//! | From | Operation | To |
//! |------|-----------|----|
//! | (new) | [`ParkingSession::open`] | `pending` |
//! | `pending` | [`ParkingSession::mark_parked`] | `active` |
//! | `active` | [`ParkingSession::request_retrieval`] | `retrieval_requested` |
//! | `retrieval_requested` | [`ParkingSession::mark_retrieved`] | `completed` |
//! | `active` | [`ParkingSession::check_out`] | `completed` |
//!
//! Payment runs alongside: [`ParkingSession::record_payment`] moves
//! `payment_status` from `pending` to `paid` exactly once. Every operation
//! returns a new value and leaves `self` untouched.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::identifiers::{SessionId, SiteId, UserId, VehicleId};
use crate::domain::records::{ParkingSite, User, Vehicle};
use crate::domain::status::{PaymentStatus, SessionStatus};

/// Payment method recorded by the mock payment flow.
pub const MOCK_PAYMENT_METHOD: &str = "test";

/// One stay of a vehicle at a parking site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingSession {
    pub id: SessionId,
    pub user_id: UserId,
    pub vehicle_id: VehicleId,
    pub site_id: SiteId,
    pub parking_spot: Option<String>,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub payment_status: PaymentStatus,
    pub payment_amount: Option<Decimal>,
    pub payment_method: Option<String>,
}

impl ParkingSession {
    /// Opens a session for `vehicle` at `site` on behalf of `user`.
    ///
    /// The fee is quoted from the site so the mock payment can default to it.
    ///
    /// # Errors
    ///
    /// - [`DomainError::VehicleNotOwned`] if the vehicle belongs to someone else
    /// - [`DomainError::SiteFull`] if the site has no free slot
    pub fn open(
        user: &User,
        vehicle: &Vehicle,
        site: &ParkingSite,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        vehicle.ensure_owned_by(user.id)?;
        if !site.has_capacity() {
            return Err(DomainError::SiteFull(site.id));
        }

        Ok(Self {
            id: SessionId::generate(),
            user_id: user.id,
            vehicle_id: vehicle.id,
            site_id: site.id,
            parking_spot: None,
            entry_time: now,
            exit_time: None,
            status: SessionStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_amount: Some(site.fixed_parking_fee),
            payment_method: None,
        })
    }

    /// Returns `true` once the fee is settled.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// Records that a valet has put the car in `parking_spot`.
    ///
    /// # Errors
    ///
    /// - [`DomainError::InvalidField`] if the spot is blank
    /// - [`DomainError::InvalidSessionTransition`] unless the session is `pending`
    pub fn mark_parked(&self, parking_spot: &str) -> Result<Self, DomainError> {
        let spot = parking_spot.trim();
        if spot.is_empty() {
            return Err(DomainError::invalid_field(
                "parking_spot",
                "must not be blank",
            ));
        }
        self.ensure_status(SessionStatus::Pending, SessionStatus::Active)?;

        Ok(Self {
            status: SessionStatus::Active,
            parking_spot: Some(spot.to_string()),
            ..self.clone()
        })
    }

    /// Records the customer's request to get the car back.
    ///
    /// # Errors
    ///
    /// - [`DomainError::SessionNotOwned`] if `user_id` is not the owner
    /// - [`DomainError::InvalidSessionTransition`] unless the session is `active`
    /// - [`DomainError::PaymentRequired`] if the fee is unpaid
    pub fn request_retrieval(&self, user_id: UserId) -> Result<Self, DomainError> {
        self.ensure_owned_by(user_id)?;
        self.ensure_status(SessionStatus::Active, SessionStatus::RetrievalRequested)?;
        if !self.is_paid() {
            return Err(DomainError::PaymentRequired);
        }

        Ok(Self {
            status: SessionStatus::RetrievalRequested,
            ..self.clone()
        })
    }

    /// Records that the valet handed the car back.
    ///
    /// # Errors
    ///
    /// [`DomainError::InvalidSessionTransition`] unless the session is
    /// `retrieval_requested`.
    pub fn mark_retrieved(&self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.ensure_status(SessionStatus::RetrievalRequested, SessionStatus::Completed)?;

        Ok(Self {
            status: SessionStatus::Completed,
            exit_time: Some(now),
            ..self.clone()
        })
    }

    /// Closes a parked, paid session without a valet retrieval run.
    ///
    /// # Errors
    ///
    /// - [`DomainError::InvalidSessionTransition`] unless the session is `active`
    /// - [`DomainError::PaymentRequired`] if the fee is unpaid
    pub fn check_out(&self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.ensure_status(SessionStatus::Active, SessionStatus::Completed)?;
        if !self.is_paid() {
            return Err(DomainError::PaymentRequired);
        }

        Ok(Self {
            status: SessionStatus::Completed,
            exit_time: Some(now),
            ..self.clone()
        })
    }

    /// Settles the fee.
    ///
    /// # Errors
    ///
    /// - [`DomainError::AlreadyPaid`] if the fee was settled before
    /// - [`DomainError::InvalidAmount`] unless `amount` is positive
    pub fn record_payment(&self, amount: Decimal, method: &str) -> Result<Self, DomainError> {
        if self.is_paid() {
            return Err(DomainError::AlreadyPaid);
        }
        if amount <= Decimal::ZERO {
            return Err(DomainError::InvalidAmount(amount));
        }

        Ok(Self {
            payment_status: PaymentStatus::Paid,
            payment_amount: Some(amount),
            payment_method: Some(method.to_string()),
            ..self.clone()
        })
    }

    fn ensure_owned_by(&self, user_id: UserId) -> Result<(), DomainError> {
        if self.user_id == user_id {
            Ok(())
        } else {
            Err(DomainError::SessionNotOwned(user_id))
        }
    }

    fn ensure_status(&self, expected: SessionStatus, to: SessionStatus) -> Result<(), DomainError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(DomainError::InvalidSessionTransition {
                from: self.status,
                to,
            })
        }
    }
}
