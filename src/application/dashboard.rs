//! Dashboard aggregation.
//!
//! Handlers fetch rows through the ports; everything here is a left fold
//! over those rows.

use lambars::typeclass::Foldable;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{ParkingSite, SessionDetail, SessionStatus};

/// Running counts over a set of sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    tickets: usize,
    /// Amounts actually collected; unpaid quotes are ignored.
    collection: Decimal,
    active: usize,
}

impl Tally {
    fn of<'a>(details: impl IntoIterator<Item = &'a SessionDetail>) -> Self {
        details
            .into_iter()
            .collect::<Vec<_>>()
            .fold_left(Self::default(), Self::record)
    }

    fn record(self, detail: &SessionDetail) -> Self {
        let session = &detail.session;
        let collection = if session.is_paid() {
            session
                .payment_amount
                .fold_left(self.collection, |sum, amount| sum + amount)
        } else {
            self.collection
        };

        Self {
            tickets: self.tickets + 1,
            collection,
            active: self.active + usize::from(session.status == SessionStatus::Active),
        }
    }
}

/// Live view for a site manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerDashboard {
    pub active_cars: usize,
    pub retrieving: usize,
    pub total_today: usize,
    pub revenue: Decimal,
    /// Parked cars with their detail, newest first.
    pub assignments: Vec<SessionDetail>,
}

impl ManagerDashboard {
    /// Builds the dashboard from active sessions, the number of unfinished
    /// retrieve runs and today's paid sessions.
    #[must_use]
    pub fn build(
        active: Vec<SessionDetail>,
        open_retrievals: usize,
        paid_today: &[SessionDetail],
    ) -> Self {
        let today = Tally::of(paid_today);

        Self {
            active_cars: active.len(),
            retrieving: open_retrievals,
            total_today: today.tickets,
            revenue: today.collection,
            assignments: active,
        }
    }
}

/// Recently completed sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingHistory {
    pub total_bookings: usize,
    pub history: Vec<SessionDetail>,
}

impl ParkingHistory {
    #[must_use]
    pub fn build(history: Vec<SessionDetail>) -> Self {
        Self {
            total_bookings: history.len(),
            history,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayPerformance {
    pub tickets_issued: usize,
    pub collection: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_tickets: usize,
    pub total_collection: Decimal,
    pub active_parking: usize,
}

/// Cross-site view, optionally scoped to a single site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuperAdminDashboard {
    pub today_performance: TodayPerformance,
    pub statistics: Statistics,
    pub sites: Vec<ParkingSite>,
}

impl SuperAdminDashboard {
    /// Builds the dashboard from today's sessions, all sessions and the
    /// sites in scope. Collections count settled payments only.
    #[must_use]
    pub fn build(today: &[SessionDetail], all: &[SessionDetail], sites: Vec<ParkingSite>) -> Self {
        let today = Tally::of(today);
        let all = Tally::of(all);

        Self {
            today_performance: TodayPerformance {
                tickets_issued: today.tickets,
                collection: today.collection,
            },
            statistics: Statistics {
                total_tickets: all.tickets,
                total_collection: all.collection,
                active_parking: all.active,
            },
            sites,
        }
    }
}
