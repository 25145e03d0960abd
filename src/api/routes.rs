//! Route table and middleware stack.
//!
//! # Routes
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | / | `welcome` |
//! | GET | /health | `health_check` |
//! | GET | /api/sites | `list_sites` |
//! | GET | /api/users/{user_id}/profile | `get_profile` |
//! | GET, POST | /api/users/{user_id}/vehicles | `list_vehicles`, `create_vehicle` |
//! | PUT, DELETE | /api/vehicles/{vehicle_id} | `update_vehicle`, `delete_vehicle` |
//! | POST | /api/parking-request | `create_parking_request` |
//! | GET | /api/my-session/{user_id} | `my_session` |
//! | GET | /api/parking-session/{user_id} | `latest_session` |
//! | POST | /api/complete-parking-session | `complete_parking_session` |
//! | POST | /api/request-retrieval | `request_retrieval` |
//! | POST | /api/mock-payment | `mock_payment` |
//! | GET | /api/my-history/{user_id} | `my_history` |
//! | GET | /api/driver/requests | `pending_requests` |
//! | GET | /api/driver/{driver_id}/active | `active_assignments` |
//! | GET | /api/driver/{driver_id} | `get_driver` |
//! | GET, POST | /api/drivers | `list_drivers`, `create_driver` |
//! | PUT, DELETE | /api/drivers/{driver_id} | `update_driver`, `delete_driver` |
//! | POST | /api/driver/accept/{request_id} | `accept_request` |
//! | POST | /api/driver/complete-parking | `complete_parking` |
//! | POST | /api/driver/complete-retrieval | `complete_retrieval` |
//! | GET | /api/manager/dashboard | `manager_dashboard` |
//! | GET | /api/parking-history | `parking_history` |
//! | GET | /api/parking-sessions | `sessions_by_status` |
//! | GET | /api/super-admin/dashboard | `super_admin_dashboard` |

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::api::dto::HealthResponse;
use crate::api::handlers::{
    accept_request, active_assignments, complete_parking, complete_parking_session,
    complete_retrieval, create_driver, create_parking_request, create_vehicle, delete_driver,
    delete_vehicle, get_driver, get_profile, latest_session, list_drivers, list_sites,
    list_vehicles, manager_dashboard, mock_payment, my_history, my_session, parking_history,
    pending_requests, request_retrieval, sessions_by_status, super_admin_dashboard,
    update_driver, update_vehicle,
};
use crate::infrastructure::{AppConfig, AppDependencies};

const WELCOME: &str = "Welcome to the valet parking API";

/// `GET /`
#[allow(clippy::unused_async)]
pub async fn welcome() -> &'static str {
    WELCOME
}

/// `GET /health`
///
/// ```json
/// { "status": "healthy", "version": "0.1.0" }
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Routes under `/api`.
fn api_routes() -> Router<AppDependencies> {
    Router::new()
        // Customers
        .route("/sites", get(list_sites))
        .route("/users/{user_id}/profile", get(get_profile))
        .route(
            "/users/{user_id}/vehicles",
            get(list_vehicles).post(create_vehicle),
        )
        .route(
            "/vehicles/{vehicle_id}",
            put(update_vehicle).delete(delete_vehicle),
        )
        .route("/parking-request", post(create_parking_request))
        .route("/my-session/{user_id}", get(my_session))
        .route("/parking-session/{user_id}", get(latest_session))
        .route("/complete-parking-session", post(complete_parking_session))
        .route("/request-retrieval", post(request_retrieval))
        .route("/mock-payment", post(mock_payment))
        .route("/my-history/{user_id}", get(my_history))
        // Drivers
        .route("/driver/requests", get(pending_requests))
        .route("/driver/{driver_id}/active", get(active_assignments))
        .route("/driver/{driver_id}", get(get_driver))
        .route("/drivers", get(list_drivers).post(create_driver))
        .route(
            "/drivers/{driver_id}",
            put(update_driver).delete(delete_driver),
        )
        .route("/driver/accept/{request_id}", post(accept_request))
        .route("/driver/complete-parking", post(complete_parking))
        .route("/driver/complete-retrieval", post(complete_retrieval))
        // Dashboards
        .route("/manager/dashboard", get(manager_dashboard))
        .route("/parking-history", get(parking_history))
        .route("/parking-sessions", get(sessions_by_status))
        .route("/super-admin/dashboard", get(super_admin_dashboard))
}

/// Allows the configured origin, or any origin when none is set.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match config.cors_allowed_origin.as_deref() {
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(origin) => layer.allow_origin(origin),
            Err(_) => {
                tracing::warn!(origin, "ignoring unparseable CORS origin");
                layer.allow_origin(Any)
            }
        },
        None => layer.allow_origin(Any),
    }
}

/// Builds the application router.
///
/// Requests get an `x-request-id` (generated unless the client sent one),
/// which is recorded on the trace span and echoed in the response.
///
/// ```rust,ignore
/// use valet::api::routes::create_router;
/// use valet::infrastructure::AppDependencies;
///
/// let router = create_router(AppDependencies::in_memory());
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
/// axum::serve(listener, router).await?;
/// ```
pub fn create_router(dependencies: AppDependencies) -> Router {
    let cors = cors_layer(dependencies.config());

    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .with_state(dependencies)
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
