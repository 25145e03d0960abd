//! Application layer.
//!
//! - `commands`: typed inputs for every write
//! - `validation`: field validators used by the commands
//! - `workflows`: pure multi-record transitions
//! - `queries`: read-side filters
//! - `dashboard`: aggregation for the manager and super-admin screens
//! - `ports`: storage traits implemented by the infrastructure layer

pub mod commands;
pub mod dashboard;
pub mod ports;
pub mod queries;
pub mod validation;
pub mod workflows;

pub use commands::{
    AcceptRequest, CompleteParking, CompleteParkingSession, CompleteRetrieval, CreateDriver,
    CreateParkingRequest, CreateVehicle, DriverChanges, MockPayment, RequestRetrieval,
    UpdateDriver, UpdateVehicle, VehicleChanges,
};
pub use dashboard::{ManagerDashboard, ParkingHistory, SuperAdminDashboard};
pub use ports::{
    AssignmentFilter, OpenedSession, SessionFilter, SessionOrder, SessionRepository,
    SiteRepository, StoreError, StoreIO, UserRepository, VehicleRepository,
};
