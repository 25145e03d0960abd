//! Data transfer objects for the HTTP API.
//!
//! - `requests`: bodies and query strings, with conversions into commands
//! - `responses`: the success and error envelopes

pub mod requests;
pub mod responses;

pub use requests::{
    AcceptRequestBody, CompleteParkingBody, CompleteParkingSessionBody, CompleteRetrievalBody,
    CreateDriverRequest, CreateVehicleRequest, MockPaymentBody, ParkingRequestBody,
    RetrievalRequestBody, SessionsQuery, SuperAdminQuery, UpdateDriverRequest,
    UpdateVehicleRequest,
};
pub use responses::{ApiResponse, ErrorResponse, HealthResponse, MessageResponse};
