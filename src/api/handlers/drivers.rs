//! Driver handlers: the run queue, the driver half of the workflow and
//! driver account management.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Utc;

use crate::api::dto::{
    AcceptRequestBody, ApiResponse, CompleteParkingBody, CompleteRetrievalBody,
    CreateDriverRequest, MessageResponse, UpdateDriverRequest,
};
use crate::api::error::ApiError;
use crate::application::commands::{CreateDriver, UpdateDriver};
use crate::application::ports::StoreError;
use crate::application::queries;
use crate::domain::{AssignmentDetail, AssignmentId, User, UserId, ValetAssignment};
use crate::infrastructure::AppDependencies;

type JsonBody<T> = Result<Json<T>, JsonRejection>;

// =============================================================================
// Run Queue
// =============================================================================

/// Runs waiting for a driver, oldest first.
///
/// # Endpoint
///
/// `GET /api/driver/requests`
///
/// # Examples
///
/// ```json
/// {
///   "success": true,
///   "data": [{
///     "id": "...",
///     "assignment_type": "park",
///     "status": "pending",
///     "parking_sessions": {
///       "id": "...",
///       "users": { "name": "Demo User", "phone": "9876543210" },
///       "vehicles": { "vehicle_name": "Honda City", "plate_number": "MH 02 AB 1234" },
///       "parking_sites": { "name": "Phoenix Mall", "address": "Lower Parel" }
///     }
///   }]
/// }
/// ```
pub async fn pending_requests(
    State(dependencies): State<AppDependencies>,
) -> Result<Json<ApiResponse<Vec<AssignmentDetail>>>, ApiError> {
    let queue = dependencies
        .sessions()
        .find_assignments(queries::driver_queue())
        .await?;

    Ok(ApiResponse::ok(queue))
}

/// `GET /api/driver/{driver_id}/active`: runs the driver has accepted.
pub async fn active_assignments(
    State(dependencies): State<AppDependencies>,
    Path(driver_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<AssignmentDetail>>>, ApiError> {
    let driver_id = UserId::parse(&driver_id)?;

    let active = dependencies
        .sessions()
        .find_assignments(queries::driver_active(driver_id))
        .await?;

    Ok(ApiResponse::ok(active))
}

/// Takes a pending run.
///
/// # Endpoint
///
/// `POST /api/driver/accept/{request_id}`
///
/// # Request Body
///
/// ```json
/// { "driver_id": "..." }
/// ```
///
/// # Response
///
/// - `200 OK` - the run, now `in_progress`, with its session
/// - `403 Forbidden` - the account is not a driver
/// - `404 Not Found` - unknown run or driver
/// - `409 Conflict` - another driver took it first, or the driver is off duty
pub async fn accept_request(
    State(dependencies): State<AppDependencies>,
    Path(request_id): Path<String>,
    body: JsonBody<AcceptRequestBody>,
) -> Result<Json<ApiResponse<AssignmentDetail>>, ApiError> {
    let assignment_id = AssignmentId::parse(&request_id)?;
    let Json(body) = body?;
    let command = body.into_command(assignment_id)?;

    let accepted = dependencies.sessions().accept_assignment(command).await?;

    tracing::info!(%assignment_id, driver_id = %command.driver_id, "run accepted");
    Ok(ApiResponse::ok(accepted))
}

/// Reports a car parked at a spot.
///
/// # Endpoint
///
/// `POST /api/driver/complete-parking`
///
/// # Request Body
///
/// ```json
/// { "assignment_id": "...", "parking_spot": "A-24" }
/// ```
pub async fn complete_parking(
    State(dependencies): State<AppDependencies>,
    body: JsonBody<CompleteParkingBody>,
) -> Result<Json<ApiResponse<ValetAssignment>>, ApiError> {
    let Json(body) = body?;
    let command = body.into_command()?;

    let assignment = dependencies
        .sessions()
        .complete_parking(command, Utc::now())
        .await?;

    tracing::info!(
        assignment_id = %assignment.id,
        session_id = %assignment.session_id,
        "car parked"
    );
    Ok(ApiResponse::ok(assignment))
}

/// `POST /api/driver/complete-retrieval`: the car is back with its owner.
pub async fn complete_retrieval(
    State(dependencies): State<AppDependencies>,
    body: JsonBody<CompleteRetrievalBody>,
) -> Result<Json<ApiResponse<ValetAssignment>>, ApiError> {
    let Json(body) = body?;
    let command = body.into_command()?;

    let assignment = dependencies
        .sessions()
        .complete_retrieval(command, Utc::now())
        .await?;

    tracing::info!(
        assignment_id = %assignment.id,
        session_id = %assignment.session_id,
        "car returned"
    );
    Ok(ApiResponse::ok(assignment))
}

// =============================================================================
// Driver Accounts
// =============================================================================

/// `GET /api/driver/{driver_id}`
pub async fn get_driver(
    State(dependencies): State<AppDependencies>,
    Path(driver_id): Path<String>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let driver_id = UserId::parse(&driver_id)?;

    let driver = dependencies
        .users()
        .find_user(driver_id)
        .await?
        .filter(User::is_driver)
        .ok_or_else(|| StoreError::not_found("driver", driver_id))?;

    Ok(ApiResponse::ok(driver))
}

/// `GET /api/drivers`: newest account first.
pub async fn list_drivers(
    State(dependencies): State<AppDependencies>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let drivers = dependencies.users().list_drivers().await?;
    Ok(ApiResponse::ok(drivers))
}

/// Creates an available driver.
///
/// # Endpoint
///
/// `POST /api/drivers`
///
/// # Response
///
/// - `201 Created` - the driver
/// - `400 Bad Request` - missing name, malformed email or phone
/// - `409 Conflict` - email already registered
pub async fn create_driver(
    State(dependencies): State<AppDependencies>,
    body: JsonBody<CreateDriverRequest>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let Json(request) = body?;

    let driver = CreateDriver::from(request).into_user(Utc::now())?;
    let driver = dependencies.users().insert_user(driver).await?;

    tracing::info!(driver_id = %driver.id, "driver created");
    Ok(ApiResponse::created(driver))
}

/// `PUT /api/drivers/{driver_id}`
pub async fn update_driver(
    State(dependencies): State<AppDependencies>,
    Path(driver_id): Path<String>,
    body: JsonBody<UpdateDriverRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let driver_id = UserId::parse(&driver_id)?;
    let Json(request) = body?;

    let changes = UpdateDriver::from(request).validate()?;
    let driver = dependencies.users().update_driver(driver_id, changes).await?;

    Ok(ApiResponse::ok(driver))
}

/// Deletes a driver with no runs on record.
///
/// # Endpoint
///
/// `DELETE /api/drivers/{driver_id}`
pub async fn delete_driver(
    State(dependencies): State<AppDependencies>,
    Path(driver_id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let driver_id = UserId::parse(&driver_id)?;
    dependencies.users().delete_driver(driver_id).await?;

    tracing::info!(%driver_id, "driver deleted");
    Ok(ApiResponse::ok(MessageResponse::new(
        "Driver deleted successfully",
    )))
}
