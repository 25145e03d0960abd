//! Multi-record workflows as pure functions.
//!
//! Each function takes the rows a workflow reads (already loaded and locked
//! by the storage adapter) and returns every row it writes as
//! `Either::Right`, or the broken rule as `Either::Left`. Adapters persist
//! the returned rows in one transaction; on `Left` nothing is written.
//!
//! A site slot is held from the parking request until the car leaves, so
//! `available_slots` always equals `total_slots` minus the open sessions.
//!
//! Time is injected so the functions stay deterministic under test.

use chrono::{DateTime, Utc};
use lambars::control::Either;
use rust_decimal::Decimal;

use crate::domain::{
    AssignmentType, DomainError, DomainResult, MOCK_PAYMENT_METHOD, ParkingPayment,
    ParkingSession, ParkingSite, PaymentId, User, ValetAssignment, Vehicle,
};

/// Status recorded on a payment row written by the mock gateway.
pub const PAYMENT_COMPLETED: &str = "completed";

/// Rows written when a customer asks for parking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkingRequested {
    pub session: ParkingSession,
    pub assignment: ValetAssignment,
    /// The site with the requested slot taken.
    pub site: ParkingSite,
}

/// Opens a `pending` session, queues a `pending` park run and reserves a
/// slot at the site.
///
/// `open_session` is any session of the vehicle that is not yet completed.
///
/// # Errors
///
/// - [`DomainError::VehicleInSession`] if the vehicle already has one
/// - [`DomainError::VehicleNotOwned`] if the vehicle is someone else's
/// - [`DomainError::SiteFull`] if the site has no free slot
pub fn create_parking_request(
    user: &User,
    vehicle: &Vehicle,
    site: &ParkingSite,
    open_session: Option<&ParkingSession>,
    now: DateTime<Utc>,
) -> DomainResult<ParkingRequested> {
    if open_session.is_some() {
        return Either::Left(DomainError::VehicleInSession(vehicle.id));
    }

    Either::from(ParkingSession::open(user, vehicle, site, now)).map_right(|session| {
        ParkingRequested {
            assignment: ValetAssignment::new_park(&session, now),
            site: site.occupy(),
            session,
        }
    })
}

/// Rows written when a customer asks for the car back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalRequested {
    pub session: ParkingSession,
    pub assignment: ValetAssignment,
}

/// Moves the session to `retrieval_requested` and queues a retrieve run.
///
/// # Errors
///
/// See [`ParkingSession::request_retrieval`].
pub fn request_retrieval(
    session: &ParkingSession,
    user: &User,
    now: DateTime<Utc>,
) -> DomainResult<RetrievalRequested> {
    Either::from(session.request_retrieval(user.id)).map_right(|session| RetrievalRequested {
        assignment: ValetAssignment::new_retrieve(&session, now),
        session,
    })
}

/// Hands a pending run to a driver.
///
/// # Errors
///
/// See [`ValetAssignment::accept`].
pub fn accept_request(assignment: &ValetAssignment, driver: &User) -> DomainResult<ValetAssignment> {
    Either::from(assignment.accept(driver))
}

/// Rows written when a driver parks the car.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkingCompleted {
    pub assignment: ValetAssignment,
    pub session: ParkingSession,
}

/// Finishes a park run: the session becomes `active` at `parking_spot`.
/// The slot was already taken by the request.
///
/// # Errors
///
/// See [`ValetAssignment::complete`] and [`ParkingSession::mark_parked`].
pub fn complete_parking(
    assignment: &ValetAssignment,
    session: &ParkingSession,
    parking_spot: &str,
    now: DateTime<Utc>,
) -> DomainResult<ParkingCompleted> {
    let assignment = match Either::from(assignment.complete(AssignmentType::Park, now)) {
        Either::Right(assignment) => assignment,
        Either::Left(error) => return Either::Left(error),
    };

    Either::from(session.mark_parked(parking_spot))
        .map_right(|session| ParkingCompleted { assignment, session })
}

/// Rows written when a driver hands the car back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalCompleted {
    pub assignment: ValetAssignment,
    pub session: ParkingSession,
    pub site: ParkingSite,
}

/// Finishes a retrieve run: the session becomes `completed` and the site
/// gets its slot back.
///
/// # Errors
///
/// See [`ValetAssignment::complete`] and [`ParkingSession::mark_retrieved`].
pub fn complete_retrieval(
    assignment: &ValetAssignment,
    session: &ParkingSession,
    site: &ParkingSite,
    now: DateTime<Utc>,
) -> DomainResult<RetrievalCompleted> {
    let assignment = match Either::from(assignment.complete(AssignmentType::Retrieve, now)) {
        Either::Right(assignment) => assignment,
        Either::Left(error) => return Either::Left(error),
    };

    Either::from(session.mark_retrieved(now)).map_right(|session| RetrievalCompleted {
        assignment,
        session,
        site: site.release(),
    })
}

/// Rows written by the mock payment gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRecorded {
    pub session: ParkingSession,
    pub payment: ParkingPayment,
}

/// Settles the fee. Without an explicit `amount` the quoted fee is charged.
///
/// # Errors
///
/// - [`DomainError::AlreadyPaid`] on a second payment
/// - [`DomainError::InvalidAmount`] for a non-positive or missing amount
pub fn record_payment(
    session: &ParkingSession,
    amount: Option<Decimal>,
    now: DateTime<Utc>,
) -> DomainResult<PaymentRecorded> {
    let amount = amount
        .or(session.payment_amount)
        .unwrap_or(Decimal::ZERO);

    Either::from(session.record_payment(amount, MOCK_PAYMENT_METHOD)).map_right(|paid| {
        PaymentRecorded {
            payment: ParkingPayment {
                id: PaymentId::generate(),
                session_id: paid.id,
                user_id: paid.user_id,
                amount,
                payment_method: MOCK_PAYMENT_METHOD.to_string(),
                payment_status: PAYMENT_COMPLETED.to_string(),
                transaction_id: format!("TEST-{}", now.timestamp_millis()),
                paid_at: now,
            },
            session: paid,
        }
    })
}

/// Rows written when a customer checks out a parked car.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedOut {
    pub session: ParkingSession,
    pub site: ParkingSite,
}

/// Completes a paid, `active` session and frees its slot.
///
/// # Errors
///
/// See [`ParkingSession::check_out`].
pub fn check_out(
    session: &ParkingSession,
    site: &ParkingSite,
    now: DateTime<Utc>,
) -> DomainResult<CheckedOut> {
    Either::from(session.check_out(now)).map_right(|session| CheckedOut {
        session,
        site: site.release(),
    })
}

/// Site state after importing `session` as-is: an open session holds a
/// slot like one created through [`create_parking_request`].
///
/// # Errors
///
/// [`DomainError::SiteFull`] if an open session is imported into a full site.
pub fn import_session(session: &ParkingSession, site: &ParkingSite) -> DomainResult<ParkingSite> {
    match (session.status.is_open(), site.has_capacity()) {
        (false, _) => Either::Right(site.clone()),
        (true, true) => Either::Right(site.occupy()),
        (true, false) => Either::Left(DomainError::SiteFull(site.id)),
    }
}
