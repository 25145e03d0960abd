//! Storage ports.
//!
//! Every method returns an [`AsyncIO`] so the traits stay object safe and
//! handlers can hold them as `Arc<dyn ...>`. Nothing runs until the effect
//! is awaited.
//!
//! Workflow methods on [`SessionRepository`] are transactional: an adapter
//! loads and locks every row it touches, applies the pure transition from
//! [`crate::application::workflows`] and writes all results, or writes
//! nothing.

use chrono::{DateTime, Utc};
use lambars::effect::AsyncIO;
use serde::Serialize;
use thiserror::Error;

use crate::application::commands::{
    AcceptRequest, CompleteParking, CompleteParkingSession, CompleteRetrieval,
    CreateParkingRequest, DriverChanges, MockPayment, RequestRetrieval, VehicleChanges,
};
use crate::domain::{
    AssignmentDetail, AssignmentStatus, AssignmentType, DomainError, DomainResult, ParkingSession, ParkingSite,
    PaymentStatus, SessionDetail, SessionStatus, SiteId, User, UserId, ValetAssignment, Vehicle,
    VehicleId,
};

/// Deferred storage operation.
pub type StoreIO<T> = AsyncIO<Result<T, StoreError>>;

/// Errors surfaced by storage adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The referenced row does not exist.
    #[error("{entity} not found: {identifier}")]
    NotFound {
        /// Human-readable entity name ("vehicle", "parking session", ...).
        entity: &'static str,
        /// The identifier that was looked up.
        identifier: String,
    },

    /// A unique constraint rejected the write.
    #[error("duplicate key value violates unique constraint \"{constraint}\"")]
    UniqueViolation {
        /// Name of the violated constraint.
        constraint: String,
    },

    /// The row is still referenced and cannot be deleted.
    #[error("record is still referenced by \"{constraint}\"")]
    InUse {
        /// Name of the referencing foreign key.
        constraint: String,
    },

    /// A domain rule rejected the transition.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The database failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Builds a [`StoreError::NotFound`].
    #[must_use]
    pub fn not_found(entity: &'static str, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity,
            identifier: identifier.to_string(),
        }
    }
}

/// Turns a workflow outcome into a storage result so adapters can `?` it.
///
/// # Errors
///
/// [`StoreError::Domain`] carrying the broken rule.
pub fn settle<T>(outcome: DomainResult<T>) -> Result<T, StoreError> {
    outcome.fold(|error| Err(StoreError::Domain(error)), Ok)
}

/// Sort order for session listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionOrder {
    /// Most recent `entry_time` first.
    #[default]
    NewestEntry,
    /// Most recent `exit_time` first; open sessions last.
    NewestExit,
}

/// Criteria for listing sessions. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFilter {
    pub user_id: Option<UserId>,
    pub site_id: Option<SiteId>,
    pub statuses: Vec<SessionStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub entered_since: Option<DateTime<Utc>>,
    pub order: SessionOrder,
    pub limit: Option<usize>,
}

impl SessionFilter {
    #[must_use]
    pub fn for_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    #[must_use]
    pub const fn at_site(mut self, site_id: Option<SiteId>) -> Self {
        self.site_id = site_id;
        self
    }

    #[must_use]
    pub fn with_statuses(mut self, statuses: &[SessionStatus]) -> Self {
        self.statuses = statuses.to_vec();
        self
    }

    #[must_use]
    pub const fn with_payment(mut self, payment_status: PaymentStatus) -> Self {
        self.payment_status = Some(payment_status);
        self
    }

    #[must_use]
    pub const fn entered_since(mut self, since: DateTime<Utc>) -> Self {
        self.entered_since = Some(since);
        self
    }

    #[must_use]
    pub const fn ordered_by(mut self, order: SessionOrder) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns `true` if `session` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, session: &ParkingSession) -> bool {
        self.user_id.is_none_or(|user_id| session.user_id == user_id)
            && self.site_id.is_none_or(|site_id| session.site_id == site_id)
            && (self.statuses.is_empty() || self.statuses.contains(&session.status))
            && self
                .payment_status
                .is_none_or(|payment| session.payment_status == payment)
            && self
                .entered_since
                .is_none_or(|since| session.entry_time >= since)
    }

    /// Sorts sessions by the filter's order.
    pub fn sort(&self, sessions: &mut [&ParkingSession]) {
        match self.order {
            SessionOrder::NewestEntry => {
                sessions.sort_by(|left, right| right.entry_time.cmp(&left.entry_time));
            }
            SessionOrder::NewestExit => sessions.sort_by(|left, right| {
                match (left.exit_time, right.exit_time) {
                    (Some(left), Some(right)) => right.cmp(&left),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => right.entry_time.cmp(&left.entry_time),
                }
            }),
        }
    }
}

/// Criteria for listing assignments, always oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentFilter {
    pub driver_id: Option<UserId>,
    pub statuses: Vec<AssignmentStatus>,
    pub assignment_type: Option<AssignmentType>,
}

impl AssignmentFilter {
    #[must_use]
    pub const fn for_driver(mut self, driver_id: UserId) -> Self {
        self.driver_id = Some(driver_id);
        self
    }

    #[must_use]
    pub fn with_statuses(mut self, statuses: &[AssignmentStatus]) -> Self {
        self.statuses = statuses.to_vec();
        self
    }

    #[must_use]
    pub const fn of_type(mut self, assignment_type: AssignmentType) -> Self {
        self.assignment_type = Some(assignment_type);
        self
    }

    /// Returns `true` if `assignment` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, assignment: &ValetAssignment) -> bool {
        self.driver_id
            .is_none_or(|driver_id| assignment.driver_id == Some(driver_id))
            && (self.statuses.is_empty() || self.statuses.contains(&assignment.status))
            && self
                .assignment_type
                .is_none_or(|kind| assignment.assignment_type == kind)
    }
}

/// Result of a parking request: the new session and its queued park run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenedSession {
    pub session: SessionDetail,
    pub assignment: ValetAssignment,
}

/// Account holders.
pub trait UserRepository: Send + Sync {
    fn find_user(&self, id: UserId) -> StoreIO<Option<User>>;

    fn find_user_by_email(&self, email: String) -> StoreIO<Option<User>>;

    fn insert_user(&self, user: User) -> StoreIO<User>;

    /// Drivers, newest account first.
    fn list_drivers(&self) -> StoreIO<Vec<User>>;

    /// Updates a driver; non-driver accounts are reported as not found.
    fn update_driver(&self, id: UserId, changes: DriverChanges) -> StoreIO<User>;

    /// Deletes a driver; non-driver accounts are reported as not found.
    fn delete_driver(&self, id: UserId) -> StoreIO<()>;
}

/// Parking sites.
pub trait SiteRepository: Send + Sync {
    /// All sites ordered by name.
    fn list_sites(&self) -> StoreIO<Vec<ParkingSite>>;

    fn find_site(&self, id: SiteId) -> StoreIO<Option<ParkingSite>>;

    fn insert_site(&self, site: ParkingSite) -> StoreIO<ParkingSite>;
}

/// Customer vehicles. Plate numbers are unique.
pub trait VehicleRepository: Send + Sync {
    fn list_vehicles(&self, user_id: UserId) -> StoreIO<Vec<Vehicle>>;

    fn insert_vehicle(&self, vehicle: Vehicle) -> StoreIO<Vehicle>;

    fn update_vehicle(&self, id: VehicleId, changes: VehicleChanges) -> StoreIO<Vehicle>;

    /// Deletes and returns the vehicle.
    fn delete_vehicle(&self, id: VehicleId) -> StoreIO<Vehicle>;
}

/// Parking sessions, valet assignments and the workflows between them.
pub trait SessionRepository: Send + Sync {
    fn find_sessions(&self, filter: SessionFilter) -> StoreIO<Vec<SessionDetail>>;

    fn find_assignments(&self, filter: AssignmentFilter) -> StoreIO<Vec<AssignmentDetail>>;

    /// Writes rows as-is, bypassing workflow checks. An open session still
    /// takes a slot at its site. Used for seeding.
    fn import_session(
        &self,
        session: ParkingSession,
        assignments: Vec<ValetAssignment>,
    ) -> StoreIO<()>;

    /// Opens a session, queues its park run and reserves a slot. A vehicle
    /// holds at most one open session.
    fn open_session(
        &self,
        command: CreateParkingRequest,
        now: DateTime<Utc>,
    ) -> StoreIO<OpenedSession>;

    /// Marks the session for retrieval and queues a retrieve run.
    fn request_retrieval(
        &self,
        command: RequestRetrieval,
        now: DateTime<Utc>,
    ) -> StoreIO<ValetAssignment>;

    /// Hands a pending run to a driver.
    fn accept_assignment(&self, command: AcceptRequest) -> StoreIO<AssignmentDetail>;

    /// Finishes a park run: session active, run completed.
    fn complete_parking(
        &self,
        command: CompleteParking,
        now: DateTime<Utc>,
    ) -> StoreIO<ValetAssignment>;

    /// Finishes a retrieve run: session completed, run completed, one slot freed.
    fn complete_retrieval(
        &self,
        command: CompleteRetrieval,
        now: DateTime<Utc>,
    ) -> StoreIO<ValetAssignment>;

    /// Settles the fee and records a payment row.
    fn record_payment(
        &self,
        command: MockPayment,
        now: DateTime<Utc>,
    ) -> StoreIO<ParkingSession>;

    /// Closes a parked, paid session and frees its slot.
    fn check_out(
        &self,
        command: CompleteParkingSession,
        now: DateTime<Utc>,
    ) -> StoreIO<ParkingSession>;
}
