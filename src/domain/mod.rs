//! Domain layer for the valet service.
//!
//! Pure business rules with no I/O:
//!
//! - `identifiers`: UUID v7 newtypes for every record
//! - `status`: text-backed enumerations (roles, lifecycles)
//! - `records`: users, vehicles, sites, payments
//! - `session`: the parking session aggregate and its transitions
//! - `assignment`: the valet assignment aggregate and its transitions
//! - `views`: nested read models for the API
//! - `errors`: rule violations

pub mod assignment;
pub mod errors;
pub mod identifiers;
pub mod records;
pub mod session;
pub mod status;
pub mod views;

pub use assignment::ValetAssignment;
pub use errors::{DomainError, DomainErrorKind, DomainResult};
pub use identifiers::{
    AssignmentId, IdentifierError, PaymentId, SessionId, SiteId, UserId, VehicleId,
};
pub use records::{ParkingPayment, ParkingSite, User, Vehicle};
pub use session::{MOCK_PAYMENT_METHOD, ParkingSession};
pub use status::{
    AssignmentStatus, AssignmentType, ParseStatusError, PaymentStatus, SessionStatus, UserRole,
    VehicleType,
};
pub use views::{AssignmentDetail, DetailIndex, DetailSource, SessionDetail};
