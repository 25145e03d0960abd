//! Read-side query definitions.
//!
//! Each function returns the filter a screen needs; handlers pass it to the
//! session port. Keeping the criteria here means both storage adapters and
//! the tests agree on what "current session" or "driver queue" means.

use chrono::{DateTime, NaiveTime, Utc};

use crate::application::ports::{AssignmentFilter, SessionFilter, SessionOrder};
use crate::domain::{
    AssignmentStatus, AssignmentType, ParseStatusError, PaymentStatus, SessionStatus, SiteId,
    UserId,
};

/// Completed sessions shown on a customer's history screen.
pub const HISTORY_LIMIT: usize = 20;

/// Completed sessions shown on the manager's history screen.
pub const RECENT_COMPLETED_LIMIT: usize = 10;

/// Midnight UTC of the day containing `now`.
#[must_use]
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// The customer's newest session that is still open.
#[must_use]
pub fn current_session(user_id: UserId) -> SessionFilter {
    SessionFilter::default()
        .for_user(user_id)
        .with_statuses(SessionStatus::OPEN)
        .limit(1)
}

/// The customer's newest session in any status.
#[must_use]
pub fn latest_session(user_id: UserId) -> SessionFilter {
    SessionFilter::default().for_user(user_id).limit(1)
}

/// The customer's completed sessions, most recently finished first.
#[must_use]
pub fn user_history(user_id: UserId) -> SessionFilter {
    SessionFilter::default()
        .for_user(user_id)
        .with_statuses(&[SessionStatus::Completed])
        .ordered_by(SessionOrder::NewestExit)
        .limit(HISTORY_LIMIT)
}

/// Cars currently parked, newest first.
#[must_use]
pub fn active_sessions(site_id: Option<SiteId>) -> SessionFilter {
    SessionFilter::default()
        .at_site(site_id)
        .with_statuses(&[SessionStatus::Active])
}

/// Paid sessions that entered since `since`.
#[must_use]
pub fn paid_sessions_since(since: DateTime<Utc>) -> SessionFilter {
    SessionFilter::default()
        .with_payment(PaymentStatus::Paid)
        .entered_since(since)
}

/// Every session at a site (or everywhere), optionally only those entered
/// since `since`.
#[must_use]
pub fn site_sessions(site_id: Option<SiteId>, since: Option<DateTime<Utc>>) -> SessionFilter {
    SessionFilter {
        entered_since: since,
        ..SessionFilter::default().at_site(site_id)
    }
}

/// The latest completed sessions across all sites.
#[must_use]
pub fn recent_completed() -> SessionFilter {
    SessionFilter::default()
        .with_statuses(&[SessionStatus::Completed])
        .limit(RECENT_COMPLETED_LIMIT)
}

/// Sessions in one status, or all sessions when `status` is `None`.
#[must_use]
pub fn sessions_by_status(status: Option<SessionStatus>) -> SessionFilter {
    status.map_or_else(SessionFilter::default, |status| {
        SessionFilter::default().with_statuses(&[status])
    })
}

/// Parses the `status` query parameter; absent, blank and `all` mean
/// "no filter".
///
/// # Errors
///
/// [`ParseStatusError`] for an unknown status.
pub fn parse_status_filter(raw: Option<&str>) -> Result<Option<SessionStatus>, ParseStatusError> {
    match raw.map(str::trim) {
        None | Some("" | "all") => Ok(None),
        Some(status) => status.parse().map(Some),
    }
}

/// Runs waiting for a driver, oldest first.
#[must_use]
pub fn driver_queue() -> AssignmentFilter {
    AssignmentFilter::default().with_statuses(&[AssignmentStatus::Pending])
}

/// Runs a driver has accepted but not finished.
#[must_use]
pub fn driver_active(driver_id: UserId) -> AssignmentFilter {
    AssignmentFilter::default()
        .for_driver(driver_id)
        .with_statuses(&[AssignmentStatus::InProgress])
}

/// Retrieve runs not yet finished.
#[must_use]
pub fn open_retrievals() -> AssignmentFilter {
    AssignmentFilter::default()
        .of_type(AssignmentType::Retrieve)
        .with_statuses(&[AssignmentStatus::Pending, AssignmentStatus::InProgress])
}
