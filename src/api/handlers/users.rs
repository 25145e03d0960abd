//! Customer handlers.
//!
//! - sites and profile lookups
//! - vehicle registration and maintenance
//! - the customer half of the parking workflow (request, pay, retrieve,
//!   check out) and the session screens

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Utc;

use crate::api::dto::{
    ApiResponse, CompleteParkingSessionBody, CreateVehicleRequest, MockPaymentBody,
    ParkingRequestBody, RetrievalRequestBody, UpdateVehicleRequest,
};
use crate::api::error::ApiError;
use crate::application::commands::UpdateVehicle;
use crate::application::ports::{OpenedSession, StoreError};
use crate::application::queries;
use crate::domain::{
    ParkingSession, ParkingSite, SessionDetail, User, UserId, ValetAssignment, Vehicle, VehicleId,
};
use crate::infrastructure::AppDependencies;

type JsonBody<T> = Result<Json<T>, JsonRejection>;

// =============================================================================
// Sites and Profile
// =============================================================================

/// Lists every parking site, ordered by name.
///
/// # Endpoint
///
/// `GET /api/sites`
pub async fn list_sites(
    State(dependencies): State<AppDependencies>,
) -> Result<Json<ApiResponse<Vec<ParkingSite>>>, ApiError> {
    let sites = dependencies.sites().list_sites().await?;
    Ok(ApiResponse::ok(sites))
}

/// Returns a user's account.
///
/// # Endpoint
///
/// `GET /api/users/{user_id}/profile`
///
/// # Response
///
/// - `200 OK` - the user
/// - `400 Bad Request` - malformed id
/// - `404 Not Found` - no such user
pub async fn get_profile(
    State(dependencies): State<AppDependencies>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user_id = UserId::parse(&user_id)?;

    let user = dependencies
        .users()
        .find_user(user_id)
        .await?
        .ok_or_else(|| StoreError::not_found("user", user_id))?;

    Ok(ApiResponse::ok(user))
}

// =============================================================================
// Vehicles
// =============================================================================

/// `GET /api/users/{user_id}/vehicles`
pub async fn list_vehicles(
    State(dependencies): State<AppDependencies>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Vehicle>>>, ApiError> {
    let user_id = UserId::parse(&user_id)?;
    let vehicles = dependencies.vehicles().list_vehicles(user_id).await?;
    Ok(ApiResponse::ok(vehicles))
}

/// Registers a vehicle for a customer.
///
/// # Endpoint
///
/// `POST /api/users/{user_id}/vehicles`
///
/// # Response
///
/// - `201 Created` - the new vehicle
/// - `400 Bad Request` - missing name or plate
/// - `404 Not Found` - no such user
/// - `409 Conflict` - plate number already registered
pub async fn create_vehicle(
    State(dependencies): State<AppDependencies>,
    Path(user_id): Path<String>,
    body: JsonBody<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vehicle>>), ApiError> {
    let user_id = UserId::parse(&user_id)?;
    let Json(request) = body?;

    let vehicle = request.into_command(user_id).into_vehicle(Utc::now())?;
    let vehicle = dependencies.vehicles().insert_vehicle(vehicle).await?;

    tracing::info!(vehicle_id = %vehicle.id, %user_id, "vehicle registered");
    Ok(ApiResponse::created(vehicle))
}

/// `PUT /api/vehicles/{vehicle_id}`; only the fields present change.
pub async fn update_vehicle(
    State(dependencies): State<AppDependencies>,
    Path(vehicle_id): Path<String>,
    body: JsonBody<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<Vehicle>>, ApiError> {
    let vehicle_id = VehicleId::parse(&vehicle_id)?;
    let Json(request) = body?;

    let changes = UpdateVehicle::from(request).validate()?;
    let vehicle = dependencies
        .vehicles()
        .update_vehicle(vehicle_id, changes)
        .await?;

    Ok(ApiResponse::ok(vehicle))
}

/// Deletes a vehicle and returns it. Vehicles with parking history are
/// kept (`409 IN_USE`).
///
/// # Endpoint
///
/// `DELETE /api/vehicles/{vehicle_id}`
pub async fn delete_vehicle(
    State(dependencies): State<AppDependencies>,
    Path(vehicle_id): Path<String>,
) -> Result<Json<ApiResponse<Vehicle>>, ApiError> {
    let vehicle_id = VehicleId::parse(&vehicle_id)?;
    let vehicle = dependencies.vehicles().delete_vehicle(vehicle_id).await?;

    tracing::info!(%vehicle_id, "vehicle deleted");
    Ok(ApiResponse::ok(vehicle))
}

// =============================================================================
// Parking Workflow
// =============================================================================

/// Opens a parking session and queues a park run for the drivers.
///
/// # Endpoint
///
/// `POST /api/parking-request`
///
/// # Request Body
///
/// ```json
/// { "user_id": "...", "vehicle_id": "...", "site_id": "..." }
/// ```
///
/// # Response
///
/// - `201 Created` - `{ "session": {...}, "assignment": {...} }`
/// - `403 Forbidden` - the vehicle belongs to someone else
/// - `404 Not Found` - unknown user, vehicle or site
/// - `409 Conflict` - the site has no free slot, or the vehicle already has an
///   open session
pub async fn create_parking_request(
    State(dependencies): State<AppDependencies>,
    body: JsonBody<ParkingRequestBody>,
) -> Result<(StatusCode, Json<ApiResponse<OpenedSession>>), ApiError> {
    let Json(body) = body?;
    let command = body.into_command()?;

    let opened = dependencies
        .sessions()
        .open_session(command, Utc::now())
        .await?;

    tracing::info!(
        session_id = %opened.session.session.id,
        assignment_id = %opened.assignment.id,
        site_id = %command.site_id,
        "parking requested"
    );
    Ok(ApiResponse::created(opened))
}

/// The customer's open session, or `null`.
///
/// # Endpoint
///
/// `GET /api/my-session/{user_id}`
pub async fn my_session(
    State(dependencies): State<AppDependencies>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Option<SessionDetail>>>, ApiError> {
    let user_id = UserId::parse(&user_id)?;

    let session = dependencies
        .sessions()
        .find_sessions(queries::current_session(user_id))
        .await?
        .into_iter()
        .next();

    Ok(ApiResponse::ok(session))
}

/// The customer's latest session in any status, or `null`.
///
/// # Endpoint
///
/// `GET /api/parking-session/{user_id}`
pub async fn latest_session(
    State(dependencies): State<AppDependencies>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Option<SessionDetail>>>, ApiError> {
    let user_id = UserId::parse(&user_id)?;

    let session = dependencies
        .sessions()
        .find_sessions(queries::latest_session(user_id))
        .await?
        .into_iter()
        .next();

    Ok(ApiResponse::ok(session))
}

/// Asks for the car back and queues a retrieve run.
///
/// # Endpoint
///
/// `POST /api/request-retrieval`
///
/// # Response
///
/// - `200 OK` - the new retrieve assignment
/// - `402 Payment Required` - the fee is still outstanding
/// - `403 Forbidden` - the session belongs to someone else
/// - `409 Conflict` - the car is not parked
pub async fn request_retrieval(
    State(dependencies): State<AppDependencies>,
    body: JsonBody<RetrievalRequestBody>,
) -> Result<Json<ApiResponse<ValetAssignment>>, ApiError> {
    let Json(body) = body?;
    let command = body.into_command()?;

    let assignment = dependencies
        .sessions()
        .request_retrieval(command, Utc::now())
        .await?;

    tracing::info!(
        session_id = %command.session_id,
        assignment_id = %assignment.id,
        "retrieval requested"
    );
    Ok(ApiResponse::ok(assignment))
}

/// Settles the session fee through the mock gateway.
///
/// # Endpoint
///
/// `POST /api/mock-payment`
///
/// # Request Body
///
/// ```json
/// { "session_id": "...", "amount": 150 }
/// ```
///
/// `amount` is optional and defaults to the quoted fee.
pub async fn mock_payment(
    State(dependencies): State<AppDependencies>,
    body: JsonBody<MockPaymentBody>,
) -> Result<Json<ApiResponse<ParkingSession>>, ApiError> {
    let Json(body) = body?;
    let command = body.into_command()?;

    let session = dependencies
        .sessions()
        .record_payment(command, Utc::now())
        .await?;

    tracing::info!(
        session_id = %session.id,
        amount = ?session.payment_amount,
        "payment recorded"
    );
    Ok(ApiResponse::ok(session))
}

/// Closes a parked, paid session without a retrieve run.
///
/// # Endpoint
///
/// `POST /api/complete-parking-session`
pub async fn complete_parking_session(
    State(dependencies): State<AppDependencies>,
    body: JsonBody<CompleteParkingSessionBody>,
) -> Result<Json<ApiResponse<ParkingSession>>, ApiError> {
    let Json(body) = body?;
    let command = body.into_command()?;

    let session = dependencies
        .sessions()
        .check_out(command, Utc::now())
        .await?;

    tracing::info!(session_id = %session.id, "session checked out");
    Ok(ApiResponse::ok(session))
}

/// `GET /api/my-history/{user_id}`: completed sessions, latest exit first.
pub async fn my_history(
    State(dependencies): State<AppDependencies>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<SessionDetail>>>, ApiError> {
    let user_id = UserId::parse(&user_id)?;

    let history = dependencies
        .sessions()
        .find_sessions(queries::user_history(user_id))
        .await?;

    Ok(ApiResponse::ok(history))
}
