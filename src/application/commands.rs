//! Commands accepted by the application layer.
//!
//! Commands carry typed identifiers; the API layer parses raw strings before
//! building them. Record-creating commands validate their fields with
//! [`crate::application::validation`] when converted into records or change
//! sets.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::application::validation::{
    validate_email, validate_person_name, validate_phone, validate_plate_number,
    validate_vehicle_name,
};
use crate::domain::{
    AssignmentId, DomainError, SessionId, SiteId, User, UserId, UserRole, Vehicle, VehicleId,
    VehicleType,
};

/// Registers a vehicle for a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateVehicle {
    pub user_id: UserId,
    pub vehicle_name: String,
    pub plate_number: String,
    pub vehicle_type: Option<VehicleType>,
}

impl CreateVehicle {
    /// Validates the command and builds the vehicle record.
    ///
    /// # Errors
    ///
    /// [`DomainError::InvalidField`] for a blank name or plate.
    pub fn into_vehicle(self, now: DateTime<Utc>) -> Result<Vehicle, DomainError> {
        Ok(Vehicle {
            id: VehicleId::generate(),
            user_id: self.user_id,
            vehicle_name: validate_vehicle_name(&self.vehicle_name)?,
            plate_number: validate_plate_number(&self.plate_number)?,
            vehicle_type: self.vehicle_type.unwrap_or_default(),
            created_at: now,
        })
    }
}

/// Partial update of a vehicle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateVehicle {
    pub vehicle_name: Option<String>,
    pub plate_number: Option<String>,
    pub vehicle_type: Option<VehicleType>,
}

impl UpdateVehicle {
    /// Validates the provided fields.
    ///
    /// # Errors
    ///
    /// [`DomainError::InvalidField`] for a provided but blank name or plate.
    pub fn validate(self) -> Result<VehicleChanges, DomainError> {
        Ok(VehicleChanges {
            vehicle_name: self
                .vehicle_name
                .as_deref()
                .map(validate_vehicle_name)
                .transpose()?,
            plate_number: self
                .plate_number
                .as_deref()
                .map(validate_plate_number)
                .transpose()?,
            vehicle_type: self.vehicle_type,
        })
    }
}

/// Validated vehicle changes; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleChanges {
    pub vehicle_name: Option<String>,
    pub plate_number: Option<String>,
    pub vehicle_type: Option<VehicleType>,
}

impl VehicleChanges {
    #[must_use]
    pub fn apply_to(&self, vehicle: &Vehicle) -> Vehicle {
        Vehicle {
            vehicle_name: self
                .vehicle_name
                .clone()
                .unwrap_or_else(|| vehicle.vehicle_name.clone()),
            plate_number: self
                .plate_number
                .clone()
                .unwrap_or_else(|| vehicle.plate_number.clone()),
            vehicle_type: self.vehicle_type.unwrap_or(vehicle.vehicle_type),
            ..vehicle.clone()
        }
    }
}

/// Creates a driver account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDriver {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl CreateDriver {
    /// Validates the command and builds an available driver.
    ///
    /// # Errors
    ///
    /// [`DomainError::InvalidField`] for a blank name, a malformed email or
    /// a malformed phone number.
    pub fn into_user(self, now: DateTime<Utc>) -> Result<User, DomainError> {
        Ok(User::new(
            validate_person_name(&self.name)?,
            validate_email(&self.email)?,
            validate_phone(self.phone.as_deref())?,
            UserRole::Driver,
            now,
        ))
    }
}

/// Partial update of a driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateDriver {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_available: Option<bool>,
}

impl UpdateDriver {
    /// Validates the provided fields.
    ///
    /// # Errors
    ///
    /// [`DomainError::InvalidField`] for any provided field that fails
    /// validation.
    pub fn validate(self) -> Result<DriverChanges, DomainError> {
        Ok(DriverChanges {
            name: self
                .name
                .as_deref()
                .map(validate_person_name)
                .transpose()?,
            email: self.email.as_deref().map(validate_email).transpose()?,
            phone: self
                .phone
                .as_deref()
                .map(|phone| validate_phone(Some(phone)))
                .transpose()?,
            is_available: self.is_available,
        })
    }
}

/// Validated driver changes. `phone: Some(None)` clears the number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub is_available: Option<bool>,
}

impl DriverChanges {
    #[must_use]
    pub fn apply_to(&self, driver: &User) -> User {
        User {
            name: self.name.clone().unwrap_or_else(|| driver.name.clone()),
            email: self.email.clone().unwrap_or_else(|| driver.email.clone()),
            phone: self.phone.clone().unwrap_or_else(|| driver.phone.clone()),
            is_available: self.is_available.unwrap_or(driver.is_available),
            ..driver.clone()
        }
    }
}

/// A customer asks a valet to park a vehicle at a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateParkingRequest {
    pub user_id: UserId,
    pub vehicle_id: VehicleId,
    pub site_id: SiteId,
}

/// A customer asks for the car back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestRetrieval {
    pub session_id: SessionId,
    pub user_id: UserId,
}

/// A driver takes a pending run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptRequest {
    pub assignment_id: AssignmentId,
    pub driver_id: UserId,
}

/// A driver reports the car parked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteParking {
    pub assignment_id: AssignmentId,
    pub parking_spot: String,
}

/// A driver reports the car handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompleteRetrieval {
    pub assignment_id: AssignmentId,
}

/// Settles a session's fee through the mock gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockPayment {
    pub session_id: SessionId,
    /// Defaults to the fee quoted when the session was opened.
    pub amount: Option<Decimal>,
}

/// Closes a parked, paid session without a retrieval run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompleteParkingSession {
    pub session_id: SessionId,
}
