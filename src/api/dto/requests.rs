//! Request DTOs.
//!
//! Bodies carry identifiers as strings; each DTO parses them into typed ids
//! when it is turned into a command, so a malformed id is reported as
//! `400 INVALID_ID` rather than a generic body error.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::commands::{
    AcceptRequest, CompleteParking, CompleteParkingSession, CompleteRetrieval, CreateDriver,
    CreateParkingRequest, CreateVehicle, MockPayment, RequestRetrieval, UpdateDriver,
    UpdateVehicle,
};
use crate::domain::{
    AssignmentId, IdentifierError, SessionId, SiteId, UserId, VehicleId, VehicleType,
};

// =============================================================================
// Vehicles
// =============================================================================

/// Body of `POST /api/users/{user_id}/vehicles`.
///
/// ```json
/// { "vehicle_name": "Honda City", "plate_number": "MH 02 AB 1234", "vehicle_type": "sedan" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateVehicleRequest {
    #[serde(default)]
    pub vehicle_name: String,
    #[serde(default)]
    pub plate_number: String,
    /// Defaults to `sedan`.
    pub vehicle_type: Option<VehicleType>,
}

impl CreateVehicleRequest {
    #[must_use]
    pub fn into_command(self, user_id: UserId) -> CreateVehicle {
        CreateVehicle {
            user_id,
            vehicle_name: self.vehicle_name,
            plate_number: self.plate_number,
            vehicle_type: self.vehicle_type,
        }
    }
}

/// Body of `PUT /api/vehicles/{vehicle_id}`; absent fields are unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateVehicleRequest {
    pub vehicle_name: Option<String>,
    pub plate_number: Option<String>,
    pub vehicle_type: Option<VehicleType>,
}

impl From<UpdateVehicleRequest> for UpdateVehicle {
    fn from(request: UpdateVehicleRequest) -> Self {
        Self {
            vehicle_name: request.vehicle_name,
            plate_number: request.plate_number,
            vehicle_type: request.vehicle_type,
        }
    }
}

// =============================================================================
// Drivers
// =============================================================================

/// Body of `POST /api/drivers`.
///
/// ```json
/// { "name": "Vikram", "email": "vikram@example.com", "phone": "9000000001" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateDriverRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
}

impl From<CreateDriverRequest> for CreateDriver {
    fn from(request: CreateDriverRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            phone: request.phone,
        }
    }
}

/// Body of `PUT /api/drivers/{driver_id}`. An empty `phone` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateDriverRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_available: Option<bool>,
}

impl From<UpdateDriverRequest> for UpdateDriver {
    fn from(request: UpdateDriverRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            phone: request.phone,
            is_available: request.is_available,
        }
    }
}

// =============================================================================
// Parking Workflow
// =============================================================================

/// Body of `POST /api/parking-request`.
///
/// ```json
/// { "user_id": "0190...", "vehicle_id": "0190...", "site_id": "0190..." }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParkingRequestBody {
    pub user_id: String,
    pub vehicle_id: String,
    pub site_id: String,
}

impl ParkingRequestBody {
    /// # Errors
    ///
    /// [`IdentifierError`] if any id is not a UUID.
    pub fn into_command(self) -> Result<CreateParkingRequest, IdentifierError> {
        Ok(CreateParkingRequest {
            user_id: UserId::parse(&self.user_id)?,
            vehicle_id: VehicleId::parse(&self.vehicle_id)?,
            site_id: SiteId::parse(&self.site_id)?,
        })
    }
}

/// Body of `POST /api/request-retrieval`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RetrievalRequestBody {
    pub session_id: String,
    pub user_id: String,
}

impl RetrievalRequestBody {
    /// # Errors
    ///
    /// [`IdentifierError`] if either id is not a UUID.
    pub fn into_command(self) -> Result<RequestRetrieval, IdentifierError> {
        Ok(RequestRetrieval {
            session_id: SessionId::parse(&self.session_id)?,
            user_id: UserId::parse(&self.user_id)?,
        })
    }
}

/// Body of `POST /api/driver/accept/{request_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AcceptRequestBody {
    pub driver_id: String,
}

impl AcceptRequestBody {
    /// # Errors
    ///
    /// [`IdentifierError`] if the driver id is not a UUID.
    pub fn into_command(self, assignment_id: AssignmentId) -> Result<AcceptRequest, IdentifierError> {
        Ok(AcceptRequest {
            assignment_id,
            driver_id: UserId::parse(&self.driver_id)?,
        })
    }
}

/// Body of `POST /api/driver/complete-parking`.
///
/// ```json
/// { "assignment_id": "0190...", "parking_spot": "A-24" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompleteParkingBody {
    pub assignment_id: String,
    #[serde(default)]
    pub parking_spot: String,
}

impl CompleteParkingBody {
    /// # Errors
    ///
    /// [`IdentifierError`] if the assignment id is not a UUID.
    pub fn into_command(self) -> Result<CompleteParking, IdentifierError> {
        Ok(CompleteParking {
            assignment_id: AssignmentId::parse(&self.assignment_id)?,
            parking_spot: self.parking_spot,
        })
    }
}

/// Body of `POST /api/driver/complete-retrieval`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompleteRetrievalBody {
    pub assignment_id: String,
}

impl CompleteRetrievalBody {
    /// # Errors
    ///
    /// [`IdentifierError`] if the assignment id is not a UUID.
    pub fn into_command(self) -> Result<CompleteRetrieval, IdentifierError> {
        Ok(CompleteRetrieval {
            assignment_id: AssignmentId::parse(&self.assignment_id)?,
        })
    }
}

/// Body of `POST /api/mock-payment`. `amount` may be a number or a decimal
/// string and defaults to the quoted fee.
///
/// ```json
/// { "session_id": "0190...", "amount": 150 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MockPaymentBody {
    pub session_id: String,
    pub amount: Option<Decimal>,
}

impl MockPaymentBody {
    /// # Errors
    ///
    /// [`IdentifierError`] if the session id is not a UUID.
    pub fn into_command(self) -> Result<MockPayment, IdentifierError> {
        Ok(MockPayment {
            session_id: SessionId::parse(&self.session_id)?,
            amount: self.amount,
        })
    }
}

/// Body of `POST /api/complete-parking-session`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompleteParkingSessionBody {
    #[serde(alias = "sessionId")]
    pub session_id: String,
}

impl CompleteParkingSessionBody {
    /// # Errors
    ///
    /// [`IdentifierError`] if the session id is not a UUID.
    pub fn into_command(self) -> Result<CompleteParkingSession, IdentifierError> {
        Ok(CompleteParkingSession {
            session_id: SessionId::parse(&self.session_id)?,
        })
    }
}

// =============================================================================
// Query Strings
// =============================================================================

/// `GET /api/parking-sessions?status=active`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionsQuery {
    pub status: Option<String>,
}

/// `GET /api/super-admin/dashboard?siteId=...`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SuperAdminQuery {
    #[serde(rename = "siteId")]
    pub site_id: Option<String>,
}

impl SuperAdminQuery {
    /// Parses the optional site scope; blank means every site.
    ///
    /// # Errors
    ///
    /// [`IdentifierError`] if a non-blank value is not a UUID.
    pub fn site_id(&self) -> Result<Option<SiteId>, IdentifierError> {
        self.site_id
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(SiteId::parse)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parking_request_parses_ids() {
        let user_id = UserId::generate();
        let vehicle_id = VehicleId::generate();
        let site_id = SiteId::generate();
        let body: ParkingRequestBody = serde_json::from_value(serde_json::json!({
            "user_id": user_id.to_string(),
            "vehicle_id": vehicle_id.to_string(),
            "site_id": site_id.to_string(),
        }))
        .unwrap();

        let command = body.into_command().unwrap();

        assert_eq!(command.user_id, user_id);
        assert_eq!(command.vehicle_id, vehicle_id);
        assert_eq!(command.site_id, site_id);
    }

    #[rstest]
    fn parking_request_rejects_malformed_vehicle_id() {
        let body = ParkingRequestBody {
            user_id: UserId::generate().to_string(),
            vehicle_id: "car-1".to_string(),
            site_id: SiteId::generate().to_string(),
        };

        assert!(body.into_command().is_err());
    }

    #[rstest]
    #[case(serde_json::json!({ "session_id": "0190b7c4-5d3e-7000-8000-000000000001", "amount": 150 }))]
    #[case(serde_json::json!({ "session_id": "0190b7c4-5d3e-7000-8000-000000000001", "amount": "150" }))]
    fn payment_amount_accepts_number_or_string(#[case] json: serde_json::Value) {
        let body: MockPaymentBody = serde_json::from_value(json).unwrap();

        assert_eq!(body.amount, Some(Decimal::new(150, 0)));
    }

    #[rstest]
    fn payment_amount_is_optional() {
        let body: MockPaymentBody = serde_json::from_value(serde_json::json!({
            "session_id": "0190b7c4-5d3e-7000-8000-000000000001"
        }))
        .unwrap();

        assert_eq!(body.into_command().unwrap().amount, None);
    }

    #[rstest]
    #[case("sessionId")]
    #[case("session_id")]
    fn check_out_accepts_both_spellings(#[case] key: &str) {
        let id = SessionId::generate();
        let mut json = serde_json::Map::new();
        json.insert(key.to_string(), serde_json::Value::String(id.to_string()));

        let body: CompleteParkingSessionBody =
            serde_json::from_value(serde_json::Value::Object(json)).unwrap();

        assert_eq!(body.into_command().unwrap().session_id, id);
    }

    #[rstest]
    fn unknown_vehicle_type_is_a_body_error() {
        let result = serde_json::from_value::<CreateVehicleRequest>(serde_json::json!({
            "vehicle_name": "Swift",
            "plate_number": "MH 04 CD 5678",
            "vehicle_type": "tractor",
        }));

        assert!(result.is_err());
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some("  "), None)]
    fn super_admin_scope_blank_means_all(#[case] raw: Option<&str>, #[case] expected: Option<SiteId>) {
        let query = SuperAdminQuery {
            site_id: raw.map(str::to_string),
        };

        assert_eq!(query.site_id().unwrap(), expected);
    }

    #[rstest]
    fn super_admin_scope_parses_site() {
        let site_id = SiteId::generate();
        let query: SuperAdminQuery =
            serde_json::from_value(serde_json::json!({ "siteId": site_id.to_string() })).unwrap();

        assert_eq!(query.site_id().unwrap(), Some(site_id));
    }
}
