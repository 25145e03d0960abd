//! Manager and super-admin screens.

use axum::Json;
use axum::extract::{Query, State};
use chrono::Utc;

use crate::api::dto::{ApiResponse, SessionsQuery, SuperAdminQuery};
use crate::api::error::ApiError;
use crate::application::dashboard::{ManagerDashboard, ParkingHistory, SuperAdminDashboard};
use crate::application::queries;
use crate::domain::SessionDetail;
use crate::infrastructure::AppDependencies;

/// Live counts for a site manager.
///
/// # Endpoint
///
/// `GET /api/manager/dashboard`
///
/// # Examples
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "activeCars": 1,
///     "retrieving": 0,
///     "totalToday": 3,
///     "revenue": "600",
///     "assignments": [ ... ]
///   }
/// }
/// ```
pub async fn manager_dashboard(
    State(dependencies): State<AppDependencies>,
) -> Result<Json<ApiResponse<ManagerDashboard>>, ApiError> {
    let sessions = dependencies.sessions();
    let today = queries::start_of_day(Utc::now());

    let active = sessions.find_sessions(queries::active_sessions(None)).await?;
    let retrieving = sessions
        .find_assignments(queries::open_retrievals())
        .await?
        .len();
    let paid_today = sessions
        .find_sessions(queries::paid_sessions_since(today))
        .await?;

    Ok(ApiResponse::ok(ManagerDashboard::build(
        active,
        retrieving,
        &paid_today,
    )))
}

/// `GET /api/parking-history`: the latest completed sessions.
pub async fn parking_history(
    State(dependencies): State<AppDependencies>,
) -> Result<Json<ApiResponse<ParkingHistory>>, ApiError> {
    let history = dependencies
        .sessions()
        .find_sessions(queries::recent_completed())
        .await?;

    Ok(ApiResponse::ok(ParkingHistory::build(history)))
}

/// Sessions filtered by status, newest first.
///
/// # Endpoint
///
/// `GET /api/parking-sessions?status=active`
///
/// `status` may be omitted or `all`; an unknown status is `400`.
pub async fn sessions_by_status(
    State(dependencies): State<AppDependencies>,
    Query(query): Query<SessionsQuery>,
) -> Result<Json<ApiResponse<Vec<SessionDetail>>>, ApiError> {
    let status = queries::parse_status_filter(query.status.as_deref())?;

    let sessions = dependencies
        .sessions()
        .find_sessions(queries::sessions_by_status(status))
        .await?;

    Ok(ApiResponse::ok(sessions))
}

/// Cross-site performance, optionally scoped with `siteId`.
///
/// # Endpoint
///
/// `GET /api/super-admin/dashboard?siteId=...`
pub async fn super_admin_dashboard(
    State(dependencies): State<AppDependencies>,
    Query(query): Query<SuperAdminQuery>,
) -> Result<Json<ApiResponse<SuperAdminDashboard>>, ApiError> {
    let site_id = query.site_id()?;
    let sessions = dependencies.sessions();
    let today = queries::start_of_day(Utc::now());

    let today_sessions = sessions
        .find_sessions(queries::site_sessions(site_id, Some(today)))
        .await?;
    let all_sessions = sessions
        .find_sessions(queries::site_sessions(site_id, None))
        .await?;
    let sites = match site_id {
        Some(site_id) => dependencies
            .sites()
            .find_site(site_id)
            .await?
            .into_iter()
            .collect(),
        None => dependencies.sites().list_sites().await?,
    };

    Ok(ApiResponse::ok(SuperAdminDashboard::build(
        &today_sessions,
        &all_sessions,
        sites,
    )))
}
