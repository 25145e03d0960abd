//! Account holders, vehicles, sites and payments.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::identifiers::{PaymentId, SessionId, SiteId, UserId, VehicleId};
use crate::domain::status::{UserRole, VehicleType};

/// An account holder of any role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new account holder.
    #[must_use]
    pub fn new(
        name: String,
        email: String,
        phone: Option<String>,
        role: UserRole,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::generate(),
            name,
            email,
            phone,
            role,
            is_available: true,
            created_at: now,
        }
    }

    /// Returns `true` for driver accounts.
    #[must_use]
    pub fn is_driver(&self) -> bool {
        self.role == UserRole::Driver
    }

    /// Checks that this user can take a valet assignment.
    ///
    /// # Errors
    ///
    /// [`DomainError::NotADriver`] for non-drivers and
    /// [`DomainError::DriverUnavailable`] for drivers marked off duty.
    pub fn ensure_can_drive(&self) -> Result<(), DomainError> {
        match (self.role, self.is_available) {
            (UserRole::Driver, true) => Ok(()),
            (UserRole::Driver, false) => Err(DomainError::DriverUnavailable(self.id)),
            _ => Err(DomainError::NotADriver(self.id)),
        }
    }
}

/// A vehicle registered by a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub user_id: UserId,
    pub vehicle_name: String,
    pub plate_number: String,
    pub vehicle_type: VehicleType,
    pub created_at: DateTime<Utc>,
}

impl Vehicle {
    /// Checks that the vehicle belongs to `user_id`.
    ///
    /// # Errors
    ///
    /// [`DomainError::VehicleNotOwned`] when it does not.
    pub fn ensure_owned_by(&self, user_id: UserId) -> Result<(), DomainError> {
        if self.user_id == user_id {
            Ok(())
        } else {
            Err(DomainError::VehicleNotOwned {
                vehicle_id: self.id,
                user_id,
            })
        }
    }
}

/// A parking site with a fixed number of valet slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingSite {
    pub id: SiteId,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub total_slots: i32,
    pub available_slots: i32,
    pub fixed_parking_fee: Decimal,
    pub created_at: DateTime<Utc>,
}

impl ParkingSite {
    /// Returns `true` when at least one slot is free.
    #[must_use]
    pub const fn has_capacity(&self) -> bool {
        self.available_slots > 0
    }

    /// Takes one slot. Never drops below zero.
    #[must_use]
    pub fn occupy(&self) -> Self {
        Self {
            available_slots: (self.available_slots - 1).max(0),
            ..self.clone()
        }
    }

    /// Frees one slot. Never exceeds `total_slots`.
    #[must_use]
    pub fn release(&self) -> Self {
        Self {
            available_slots: (self.available_slots + 1).min(self.total_slots),
            ..self.clone()
        }
    }
}

/// A settled payment for a parking session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingPayment {
    pub id: PaymentId,
    pub session_id: SessionId,
    pub user_id: UserId,
    pub amount: Decimal,
    pub payment_method: String,
    pub payment_status: String,
    pub transaction_id: String,
    pub paid_at: DateTime<Utc>,
}
