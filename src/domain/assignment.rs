//! Valet assignment aggregate.
//!
//! An assignment is one run of a driver: parking a car after a request, or
//! bringing it back after a retrieval request. It is created `pending`,
//! accepted by exactly one driver (`in_progress`) and then `completed`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::identifiers::{AssignmentId, SessionId, UserId};
use crate::domain::records::User;
use crate::domain::session::ParkingSession;
use crate::domain::status::{AssignmentStatus, AssignmentType};

/// A single valet run for a parking session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValetAssignment {
    pub id: AssignmentId,
    pub session_id: SessionId,
    pub driver_id: Option<UserId>,
    pub assignment_type: AssignmentType,
    pub status: AssignmentStatus,
    pub assigned_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ValetAssignment {
    fn queued(session: &ParkingSession, assignment_type: AssignmentType, now: DateTime<Utc>) -> Self {
        Self {
            id: AssignmentId::generate(),
            session_id: session.id,
            driver_id: None,
            assignment_type,
            status: AssignmentStatus::Pending,
            assigned_at: now,
            completed_at: None,
        }
    }

    /// Queues a park run for a freshly opened session.
    #[must_use]
    pub fn new_park(session: &ParkingSession, now: DateTime<Utc>) -> Self {
        Self::queued(session, AssignmentType::Park, now)
    }

    /// Queues a retrieve run for a session whose owner wants the car back.
    #[must_use]
    pub fn new_retrieve(session: &ParkingSession, now: DateTime<Utc>) -> Self {
        Self::queued(session, AssignmentType::Retrieve, now)
    }

    /// Hands the assignment to `driver`.
    ///
    /// # Errors
    ///
    /// - [`DomainError::NotADriver`] / [`DomainError::DriverUnavailable`]
    ///   if `driver` cannot take work
    /// - [`DomainError::InvalidAssignmentTransition`] unless the assignment is
    ///   still `pending`; an assignment is accepted at most once
    pub fn accept(&self, driver: &User) -> Result<Self, DomainError> {
        driver.ensure_can_drive()?;
        self.ensure_status(AssignmentStatus::Pending, AssignmentStatus::InProgress)?;

        Ok(Self {
            status: AssignmentStatus::InProgress,
            driver_id: Some(driver.id),
            ..self.clone()
        })
    }

    /// Finishes an accepted run of the expected kind.
    ///
    /// # Errors
    ///
    /// - [`DomainError::AssignmentTypeMismatch`] if this is the other kind of run
    /// - [`DomainError::InvalidAssignmentTransition`] unless `in_progress`
    pub fn complete(
        &self,
        expected: AssignmentType,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if self.assignment_type != expected {
            return Err(DomainError::AssignmentTypeMismatch {
                expected,
                actual: self.assignment_type,
            });
        }
        self.ensure_status(AssignmentStatus::InProgress, AssignmentStatus::Completed)?;

        Ok(Self {
            status: AssignmentStatus::Completed,
            completed_at: Some(now),
            ..self.clone()
        })
    }

    fn ensure_status(
        &self,
        expected: AssignmentStatus,
        to: AssignmentStatus,
    ) -> Result<(), DomainError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(DomainError::InvalidAssignmentTransition {
                from: self.status,
                to,
            })
        }
    }
}
