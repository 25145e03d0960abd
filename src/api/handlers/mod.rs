//! HTTP handlers, grouped by audience.

pub mod dashboard;
pub mod drivers;
pub mod users;

pub use dashboard::{manager_dashboard, parking_history, sessions_by_status, super_admin_dashboard};
pub use drivers::{
    accept_request, active_assignments, complete_parking, complete_retrieval, create_driver,
    delete_driver, get_driver, list_drivers, pending_requests, update_driver,
};
pub use users::{
    complete_parking_session, create_parking_request, create_vehicle, delete_vehicle, get_profile,
    latest_session, list_sites, list_vehicles, mock_payment, my_history, my_session,
    request_retrieval, update_vehicle,
};
