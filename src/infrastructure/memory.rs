//! In-memory storage adapter.
//!
//! Tables are persistent maps behind one `tokio::sync::RwLock`. A write
//! runs against a structurally shared draft of the state under the write
//! guard and commits the draft only on success, so a failed workflow leaves
//! the state untouched and concurrent workflows are serialized.
//!
//! Used when no `DATABASE_URL` is configured and by the test suite.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use lambars::effect::AsyncIO;
use lambars::persistent::PersistentTreeMap;
use tokio::sync::RwLock;

use crate::application::commands::{
    AcceptRequest, CompleteParking, CompleteParkingSession, CompleteRetrieval,
    CreateParkingRequest, DriverChanges, MockPayment, RequestRetrieval, VehicleChanges,
};
use crate::application::ports::{
    AssignmentFilter, OpenedSession, SessionFilter, SessionRepository, SiteRepository, StoreError,
    StoreIO, UserRepository, VehicleRepository, settle,
};
use crate::application::workflows;
use crate::domain::{
    AssignmentDetail, AssignmentId, DetailSource, ParkingPayment, ParkingSession, ParkingSite,
    PaymentId, SessionDetail, SessionId, SiteId, User, UserId, ValetAssignment, Vehicle,
    VehicleId,
};

const PLATE_CONSTRAINT: &str = "vehicles_plate_number_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";
const SESSION_VEHICLE_CONSTRAINT: &str = "parking_sessions_vehicle_id_fkey";
const ASSIGNMENT_DRIVER_CONSTRAINT: &str = "valet_assignments_driver_id_fkey";

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: PersistentTreeMap<UserId, User>,
    vehicles: PersistentTreeMap<VehicleId, Vehicle>,
    sites: PersistentTreeMap<SiteId, ParkingSite>,
    sessions: PersistentTreeMap<SessionId, ParkingSession>,
    assignments: PersistentTreeMap<AssignmentId, ValetAssignment>,
    payments: PersistentTreeMap<PaymentId, ParkingPayment>,
}

impl MemoryState {
    fn require_user(&self, id: UserId) -> Result<&User, StoreError> {
        self.users
            .get(&id)
            .ok_or_else(|| StoreError::not_found("user", id))
    }

    fn require_driver(&self, id: UserId) -> Result<&User, StoreError> {
        self.users
            .get(&id)
            .filter(|user| user.is_driver())
            .ok_or_else(|| StoreError::not_found("driver", id))
    }

    fn require_vehicle(&self, id: VehicleId) -> Result<&Vehicle, StoreError> {
        self.vehicles
            .get(&id)
            .ok_or_else(|| StoreError::not_found("vehicle", id))
    }

    fn require_site(&self, id: SiteId) -> Result<&ParkingSite, StoreError> {
        self.sites
            .get(&id)
            .ok_or_else(|| StoreError::not_found("parking site", id))
    }

    fn require_session(&self, id: SessionId) -> Result<&ParkingSession, StoreError> {
        self.sessions
            .get(&id)
            .ok_or_else(|| StoreError::not_found("parking session", id))
    }

    fn require_assignment(&self, id: AssignmentId) -> Result<&ValetAssignment, StoreError> {
        self.assignments
            .get(&id)
            .ok_or_else(|| StoreError::not_found("valet assignment", id))
    }

    fn ensure_unique_plate(&self, plate: &str, except: Option<VehicleId>) -> Result<(), StoreError> {
        let taken = self
            .vehicles
            .values()
            .any(|vehicle| vehicle.plate_number == plate && Some(vehicle.id) != except);
        if taken {
            Err(StoreError::UniqueViolation {
                constraint: PLATE_CONSTRAINT.to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn ensure_unique_email(&self, email: &str, except: Option<UserId>) -> Result<(), StoreError> {
        let taken = self
            .users
            .values()
            .any(|user| user.email.eq_ignore_ascii_case(email) && Some(user.id) != except);
        if taken {
            Err(StoreError::UniqueViolation {
                constraint: EMAIL_CONSTRAINT.to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// The vehicle's session that is not yet completed, if any.
    fn open_session_of(&self, vehicle_id: VehicleId) -> Option<&ParkingSession> {
        self.sessions
            .values()
            .find(|session| session.vehicle_id == vehicle_id && session.status.is_open())
    }

    fn put_user(&mut self, user: User) {
        self.users = self.users.insert(user.id, user);
    }

    fn put_vehicle(&mut self, vehicle: Vehicle) {
        self.vehicles = self.vehicles.insert(vehicle.id, vehicle);
    }

    fn put_session(&mut self, session: ParkingSession) {
        self.sessions = self.sessions.insert(session.id, session);
    }

    fn put_assignment(&mut self, assignment: ValetAssignment) {
        self.assignments = self.assignments.insert(assignment.id, assignment);
    }

    fn put_site(&mut self, site: ParkingSite) {
        self.sites = self.sites.insert(site.id, site);
    }

    fn put_payment(&mut self, payment: ParkingPayment) {
        self.payments = self.payments.insert(payment.id, payment);
    }
}

impl DetailSource for MemoryState {
    fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    fn site(&self, id: SiteId) -> Option<&ParkingSite> {
        self.sites.get(&id)
    }

    fn session(&self, id: SessionId) -> Option<&ParkingSession> {
        self.sessions.get(&id)
    }

    fn assignments_of(&self, session_id: SessionId) -> Vec<&ValetAssignment> {
        let mut runs: Vec<&ValetAssignment> = self
            .assignments
            .values()
            .filter(|assignment| assignment.session_id == session_id)
            .collect();
        runs.sort_by_key(|assignment| assignment.assigned_at);
        runs
    }
}

/// Storage adapter keeping every table in process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of payment rows recorded so far.
    pub async fn payment_count(&self) -> usize {
        self.state.read().await.payments.len()
    }

    fn read<T, F>(&self, query: F) -> StoreIO<T>
    where
        T: Send + 'static,
        F: FnOnce(&MemoryState) -> Result<T, StoreError> + Send + 'static,
    {
        let state = Arc::clone(&self.state);
        AsyncIO::new(move || async move { query(&*state.read().await) })
    }

    fn write<T, F>(&self, command: F) -> StoreIO<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut MemoryState) -> Result<T, StoreError> + Send + 'static,
    {
        let state = Arc::clone(&self.state);
        AsyncIO::new(move || async move {
            let mut guard = state.write().await;
            let mut draft = MemoryState::clone(&guard);
            let output = command(&mut draft)?;
            *guard = draft;
            Ok(output)
        })
    }
}

impl UserRepository for InMemoryStore {
    fn find_user(&self, id: UserId) -> StoreIO<Option<User>> {
        self.read(move |state| Ok(state.users.get(&id).cloned()))
    }

    fn find_user_by_email(&self, email: String) -> StoreIO<Option<User>> {
        self.read(move |state| {
            Ok(state
                .users
                .values()
                .find(|user| user.email.eq_ignore_ascii_case(&email))
                .cloned())
        })
    }

    fn insert_user(&self, user: User) -> StoreIO<User> {
        self.write(move |state| {
            state.ensure_unique_email(&user.email, None)?;
            state.put_user(user.clone());
            Ok(user)
        })
    }

    fn list_drivers(&self) -> StoreIO<Vec<User>> {
        self.read(|state| {
            let mut drivers: Vec<User> = state
                .users
                .values()
                .filter(|user| user.is_driver())
                .cloned()
                .collect();
            drivers.sort_by(|left, right| right.created_at.cmp(&left.created_at));
            Ok(drivers)
        })
    }

    fn update_driver(&self, id: UserId, changes: DriverChanges) -> StoreIO<User> {
        self.write(move |state| {
            let updated = changes.apply_to(state.require_driver(id)?);
            state.ensure_unique_email(&updated.email, Some(id))?;
            state.put_user(updated.clone());
            Ok(updated)
        })
    }

    fn delete_driver(&self, id: UserId) -> StoreIO<()> {
        self.write(move |state| {
            state.require_driver(id)?;
            if state
                .assignments
                .values()
                .any(|assignment| assignment.driver_id == Some(id))
            {
                return Err(StoreError::InUse {
                    constraint: ASSIGNMENT_DRIVER_CONSTRAINT.to_string(),
                });
            }
            state.users = state.users.remove(&id);
            Ok(())
        })
    }
}

impl SiteRepository for InMemoryStore {
    fn list_sites(&self) -> StoreIO<Vec<ParkingSite>> {
        self.read(|state| {
            let mut sites: Vec<ParkingSite> = state.sites.values().cloned().collect();
            sites.sort_by(|left, right| left.name.cmp(&right.name));
            Ok(sites)
        })
    }

    fn find_site(&self, id: SiteId) -> StoreIO<Option<ParkingSite>> {
        self.read(move |state| Ok(state.sites.get(&id).cloned()))
    }

    fn insert_site(&self, site: ParkingSite) -> StoreIO<ParkingSite> {
        self.write(move |state| {
            state.put_site(site.clone());
            Ok(site)
        })
    }
}

impl VehicleRepository for InMemoryStore {
    fn list_vehicles(&self, user_id: UserId) -> StoreIO<Vec<Vehicle>> {
        self.read(move |state| {
            let mut vehicles: Vec<Vehicle> = state
                .vehicles
                .values()
                .filter(|vehicle| vehicle.user_id == user_id)
                .cloned()
                .collect();
            vehicles.sort_by(|left, right| right.created_at.cmp(&left.created_at));
            Ok(vehicles)
        })
    }

    fn insert_vehicle(&self, vehicle: Vehicle) -> StoreIO<Vehicle> {
        self.write(move |state| {
            state.require_user(vehicle.user_id)?;
            state.ensure_unique_plate(&vehicle.plate_number, None)?;
            state.put_vehicle(vehicle.clone());
            Ok(vehicle)
        })
    }

    fn update_vehicle(&self, id: VehicleId, changes: VehicleChanges) -> StoreIO<Vehicle> {
        self.write(move |state| {
            let updated = changes.apply_to(state.require_vehicle(id)?);
            state.ensure_unique_plate(&updated.plate_number, Some(id))?;
            state.put_vehicle(updated.clone());
            Ok(updated)
        })
    }

    fn delete_vehicle(&self, id: VehicleId) -> StoreIO<Vehicle> {
        self.write(move |state| {
            let vehicle = state.require_vehicle(id)?.clone();
            if state
                .sessions
                .values()
                .any(|session| session.vehicle_id == id)
            {
                return Err(StoreError::InUse {
                    constraint: SESSION_VEHICLE_CONSTRAINT.to_string(),
                });
            }
            state.vehicles = state.vehicles.remove(&id);
            Ok(vehicle)
        })
    }
}

impl SessionRepository for InMemoryStore {
    fn find_sessions(&self, filter: SessionFilter) -> StoreIO<Vec<SessionDetail>> {
        self.read(move |state| {
            let mut sessions: Vec<&ParkingSession> = state
                .sessions
                .values()
                .filter(|session| filter.matches(session))
                .collect();
            filter.sort(&mut sessions);

            Ok(sessions
                .into_iter()
                .take(filter.limit.unwrap_or(usize::MAX))
                .map(|session| state.session_detail(session))
                .collect())
        })
    }

    fn find_assignments(&self, filter: AssignmentFilter) -> StoreIO<Vec<AssignmentDetail>> {
        self.read(move |state| {
            let mut assignments: Vec<&ValetAssignment> = state
                .assignments
                .values()
                .filter(|assignment| filter.matches(assignment))
                .collect();
            assignments.sort_by_key(|assignment| assignment.assigned_at);

            Ok(assignments
                .into_iter()
                .map(|assignment| state.assignment_detail(assignment))
                .collect())
        })
    }

    fn import_session(
        &self,
        session: ParkingSession,
        assignments: Vec<ValetAssignment>,
    ) -> StoreIO<()> {
        self.write(move |state| {
            let site = settle(workflows::import_session(
                &session,
                state.require_site(session.site_id)?,
            ))?;

            state.put_site(site);
            state.put_session(session);
            for assignment in assignments {
                state.put_assignment(assignment);
            }
            Ok(())
        })
    }

    fn open_session(
        &self,
        command: CreateParkingRequest,
        now: DateTime<Utc>,
    ) -> StoreIO<OpenedSession> {
        self.write(move |state| {
            let requested = settle(workflows::create_parking_request(
                state.require_user(command.user_id)?,
                state.require_vehicle(command.vehicle_id)?,
                state.require_site(command.site_id)?,
                state.open_session_of(command.vehicle_id),
                now,
            ))?;

            state.put_session(requested.session.clone());
            state.put_assignment(requested.assignment.clone());
            state.put_site(requested.site);

            Ok(OpenedSession {
                session: state.session_detail(&requested.session),
                assignment: requested.assignment,
            })
        })
    }

    fn request_retrieval(
        &self,
        command: RequestRetrieval,
        now: DateTime<Utc>,
    ) -> StoreIO<ValetAssignment> {
        self.write(move |state| {
            let requested = settle(workflows::request_retrieval(
                state.require_session(command.session_id)?,
                state.require_user(command.user_id)?,
                now,
            ))?;

            state.put_session(requested.session);
            state.put_assignment(requested.assignment.clone());
            Ok(requested.assignment)
        })
    }

    fn accept_assignment(&self, command: AcceptRequest) -> StoreIO<AssignmentDetail> {
        self.write(move |state| {
            let accepted = settle(workflows::accept_request(
                state.require_assignment(command.assignment_id)?,
                state.require_user(command.driver_id)?,
            ))?;

            state.put_assignment(accepted.clone());
            Ok(state.assignment_detail(&accepted))
        })
    }

    fn complete_parking(
        &self,
        command: CompleteParking,
        now: DateTime<Utc>,
    ) -> StoreIO<ValetAssignment> {
        self.write(move |state| {
            let assignment = state.require_assignment(command.assignment_id)?;
            let session = state.require_session(assignment.session_id)?;
            let completed = settle(workflows::complete_parking(
                assignment,
                session,
                &command.parking_spot,
                now,
            ))?;

            state.put_session(completed.session);
            state.put_assignment(completed.assignment.clone());
            Ok(completed.assignment)
        })
    }

    fn complete_retrieval(
        &self,
        command: CompleteRetrieval,
        now: DateTime<Utc>,
    ) -> StoreIO<ValetAssignment> {
        self.write(move |state| {
            let assignment = state.require_assignment(command.assignment_id)?;
            let session = state.require_session(assignment.session_id)?;
            let site = state.require_site(session.site_id)?;
            let completed = settle(workflows::complete_retrieval(assignment, session, site, now))?;

            state.put_session(completed.session);
            state.put_site(completed.site);
            state.put_assignment(completed.assignment.clone());
            Ok(completed.assignment)
        })
    }

    fn record_payment(
        &self,
        command: MockPayment,
        now: DateTime<Utc>,
    ) -> StoreIO<ParkingSession> {
        self.write(move |state| {
            let recorded = settle(workflows::record_payment(
                state.require_session(command.session_id)?,
                command.amount,
                now,
            ))?;

            state.put_session(recorded.session.clone());
            state.put_payment(recorded.payment);
            Ok(recorded.session)
        })
    }

    fn check_out(
        &self,
        command: CompleteParkingSession,
        now: DateTime<Utc>,
    ) -> StoreIO<ParkingSession> {
        self.write(move |state| {
            let session = state.require_session(command.session_id)?;
            let site = state.require_site(session.site_id)?;
            let checked_out = settle(workflows::check_out(session, site, now))?;

            state.put_session(checked_out.session.clone());
            state.put_site(checked_out.site);
            Ok(checked_out.session)
        })
    }
}
