//! Router tests, one file per area.

pub mod dashboard_tests;
pub mod driver_tests;
pub mod health_tests;
pub mod parking_flow_tests;
pub mod vehicle_tests;
