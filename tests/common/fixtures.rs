//! A small world for the router tests: one customer with a vehicle, one
//! site and one driver, over a fresh in-memory store.

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;
use valet::api::create_router;
use valet::application::ports::{SiteRepository, UserRepository};
use valet::domain::{ParkingSite, SiteId, User, UserRole};
use valet::infrastructure::{AppConfig, AppDependencies, InMemoryStore};

use super::client::TestClient;

pub const SITE_FEE: i64 = 150;

pub struct World {
    pub client: TestClient,
    pub store: InMemoryStore,
    pub customer_id: String,
    pub vehicle_id: String,
    pub site_id: String,
    pub driver_id: String,
}

pub fn site(available_slots: i32) -> ParkingSite {
    ParkingSite {
        id: SiteId::generate(),
        name: "Inorbit Mall".to_string(),
        address: Some("Malad West".to_string()),
        city: Some("Mumbai".to_string()),
        total_slots: 50,
        available_slots,
        fixed_parking_fee: Decimal::new(SITE_FEE, 0),
        created_at: Utc::now(),
    }
}

pub async fn customer(store: &InMemoryStore, email: &str) -> User {
    let user = User::new(
        "Demo User".to_string(),
        email.to_string(),
        Some("9876543210".to_string()),
        UserRole::User,
        Utc::now(),
    );
    store.insert_user(user).await.unwrap()
}

impl World {
    pub async fn new() -> Self {
        Self::with_slots(10).await
    }

    /// Customer, vehicle, site and driver; the vehicle and driver are
    /// created through the API.
    pub async fn with_slots(available_slots: i32) -> Self {
        let store = InMemoryStore::new();
        let client = TestClient::new(create_router(AppDependencies::from_store(
            AppConfig::default(),
            store.clone(),
        )));

        let customer = customer(&store, "demo@example.com").await;
        let site = store.insert_site(site(available_slots)).await.unwrap();

        let vehicle = client
            .post(
                &format!("/api/users/{}/vehicles", customer.id),
                json!({ "vehicle_name": "Honda City", "plate_number": "MH 02 AB 1234" }),
            )
            .await;
        let driver = client
            .post(
                "/api/drivers",
                json!({ "name": "Ravi Kumar", "email": "ravi@example.com", "phone": "9123456780" }),
            )
            .await;

        Self {
            customer_id: customer.id.to_string(),
            vehicle_id: vehicle.id(),
            site_id: site.id.to_string(),
            driver_id: driver.id(),
            client,
            store,
        }
    }

    pub async fn request_parking(&self) -> super::client::TestResponse {
        self.request_parking_for(&self.vehicle_id).await
    }

    pub async fn request_parking_for(&self, vehicle_id: &str) -> super::client::TestResponse {
        self.client
            .post(
                "/api/parking-request",
                json!({
                    "user_id": self.customer_id,
                    "vehicle_id": vehicle_id,
                    "site_id": self.site_id,
                }),
            )
            .await
    }

    /// Registers another vehicle for the customer. Returns its id.
    pub async fn add_vehicle(&self, plate_number: &str) -> String {
        self.client
            .post(
                &format!("/api/users/{}/vehicles", self.customer_id),
                json!({ "vehicle_name": "Maruti Swift", "plate_number": plate_number }),
            )
            .await
            .id()
    }

    /// Requests parking, accepts the park run and parks at `spot`.
    /// Returns the session id.
    pub async fn park_at(&self, spot: &str) -> String {
        let opened = self.request_parking().await;
        let session_id = opened.data()["session"]["id"].as_str().unwrap().to_string();
        let assignment_id = opened.data()["assignment"]["id"].as_str().unwrap().to_string();

        self.accept(&assignment_id).await;
        let parked = self
            .client
            .post(
                "/api/driver/complete-parking",
                json!({ "assignment_id": assignment_id, "parking_spot": spot }),
            )
            .await;
        assert_eq!(parked.status, axum::http::StatusCode::OK, "{}", parked.body);

        session_id
    }

    pub async fn accept(&self, assignment_id: &str) -> super::client::TestResponse {
        self.client
            .post(
                &format!("/api/driver/accept/{assignment_id}"),
                json!({ "driver_id": self.driver_id }),
            )
            .await
    }

    pub async fn pay(&self, session_id: &str) -> super::client::TestResponse {
        self.client
            .post("/api/mock-payment", json!({ "session_id": session_id }))
            .await
    }

    pub async fn available_slots(&self) -> i64 {
        let sites = self.client.get("/api/sites").await;
        sites.data()[0]["available_slots"].as_i64().unwrap()
    }
}

pub fn unknown_id() -> String {
    Uuid::now_v7().to_string()
}
