//! Read models returned to the API.
//!
//! The JSON shape mirrors what the mobile front end expects: a session row
//! with its customer under `users`, its vehicle under `vehicles`, its site
//! under `parking_sites` and its runs under `valet_assignments`; an
//! assignment row with its session under `parking_sessions`.

use serde::Serialize;

use crate::domain::assignment::ValetAssignment;
use crate::domain::identifiers::{SessionId, SiteId, UserId, VehicleId};
use crate::domain::records::{ParkingSite, User, Vehicle};
use crate::domain::session::ParkingSession;
use crate::domain::status::{AssignmentStatus, AssignmentType};

/// Customer (or driver) name and phone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonSummary {
    pub name: String,
    pub phone: Option<String>,
}

impl From<&User> for PersonSummary {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            phone: user.phone.clone(),
        }
    }
}

/// Vehicle name and plate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleSummary {
    pub vehicle_name: String,
    pub plate_number: String,
}

impl From<&Vehicle> for VehicleSummary {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            vehicle_name: vehicle.vehicle_name.clone(),
            plate_number: vehicle.plate_number.clone(),
        }
    }
}

/// Site name and address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteSummary {
    pub name: String,
    pub address: Option<String>,
}

impl From<&ParkingSite> for SiteSummary {
    fn from(site: &ParkingSite) -> Self {
        Self {
            name: site.name.clone(),
            address: site.address.clone(),
        }
    }
}

/// A valet run as embedded inside a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentSummary {
    pub status: AssignmentStatus,
    pub assignment_type: AssignmentType,
    pub driver_id: Option<UserId>,
    /// The driver, once one has accepted.
    pub users: Option<PersonSummary>,
}

/// A parking session with everything needed to render a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub session: ParkingSession,
    pub users: Option<PersonSummary>,
    pub vehicles: Option<VehicleSummary>,
    pub parking_sites: Option<SiteSummary>,
    pub valet_assignments: Vec<AssignmentSummary>,
}

/// A valet run with its session, for the driver screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentDetail {
    #[serde(flatten)]
    pub assignment: ValetAssignment,
    pub parking_sessions: Option<SessionDetail>,
}

/// Lookups needed to expand rows into detail views.
///
/// The in-memory store implements this over its own maps; the Postgres
/// store loads the referenced rows in bulk into a [`DetailIndex`].
pub trait DetailSource {
    fn user(&self, id: UserId) -> Option<&User>;
    fn vehicle(&self, id: VehicleId) -> Option<&Vehicle>;
    fn site(&self, id: SiteId) -> Option<&ParkingSite>;
    fn session(&self, id: SessionId) -> Option<&ParkingSession>;
    /// Runs of a session, oldest first.
    fn assignments_of(&self, session_id: SessionId) -> Vec<&ValetAssignment>;

    /// Expands a session row.
    fn session_detail(&self, session: &ParkingSession) -> SessionDetail {
        let valet_assignments = self
            .assignments_of(session.id)
            .into_iter()
            .map(|assignment| AssignmentSummary {
                status: assignment.status,
                assignment_type: assignment.assignment_type,
                driver_id: assignment.driver_id,
                users: assignment
                    .driver_id
                    .and_then(|driver_id| self.user(driver_id))
                    .map(PersonSummary::from),
            })
            .collect();

        SessionDetail {
            session: session.clone(),
            users: self.user(session.user_id).map(PersonSummary::from),
            vehicles: self.vehicle(session.vehicle_id).map(VehicleSummary::from),
            parking_sites: self.site(session.site_id).map(SiteSummary::from),
            valet_assignments,
        }
    }

    /// Expands an assignment row together with its session.
    fn assignment_detail(&self, assignment: &ValetAssignment) -> AssignmentDetail {
        AssignmentDetail {
            assignment: assignment.clone(),
            parking_sessions: self
                .session(assignment.session_id)
                .map(|session| self.session_detail(session)),
        }
    }
}

/// Owned lookup tables built from bulk-loaded rows.
#[derive(Debug, Clone, Default)]
pub struct DetailIndex {
    users: std::collections::HashMap<UserId, User>,
    vehicles: std::collections::HashMap<VehicleId, Vehicle>,
    sites: std::collections::HashMap<SiteId, ParkingSite>,
    sessions: std::collections::HashMap<SessionId, ParkingSession>,
    assignments: Vec<ValetAssignment>,
}

impl DetailIndex {
    /// Builds an index; `assignments` may be in any order.
    #[must_use]
    pub fn new(
        users: Vec<User>,
        vehicles: Vec<Vehicle>,
        sites: Vec<ParkingSite>,
        sessions: Vec<ParkingSession>,
        mut assignments: Vec<ValetAssignment>,
    ) -> Self {
        assignments.sort_by_key(|assignment| assignment.assigned_at);
        Self {
            users: users.into_iter().map(|user| (user.id, user)).collect(),
            vehicles: vehicles
                .into_iter()
                .map(|vehicle| (vehicle.id, vehicle))
                .collect(),
            sites: sites.into_iter().map(|site| (site.id, site)).collect(),
            sessions: sessions
                .into_iter()
                .map(|session| (session.id, session))
                .collect(),
            assignments,
        }
    }
}

impl DetailSource for DetailIndex {
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
        self.assignments
            .iter()
            .filter(|assignment| assignment.session_id == session_id)
            .collect()
    }
}
