//! Demo data loader.
//!
//! Ensures a demo customer with a vehicle, a site, a driver, one parked car
//! and three paid sessions from earlier today. Rows that already exist are reused,
//! so running it twice changes nothing.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use valet::application::queries;
use valet::domain::{
    AssignmentId, AssignmentStatus, AssignmentType, MOCK_PAYMENT_METHOD, ParkingSession,
    ParkingSite, PaymentStatus, SessionId, SessionStatus, SiteId, User, UserRole,
    ValetAssignment, Vehicle, VehicleId, VehicleType,
};
use valet::infrastructure::{AppConfig, AppDependencies, init_tracing};

const DEMO_EMAIL: &str = "demo@example.com";
const DRIVER_EMAIL: &str = "driver@example.com";
const SITE_SLOTS: i32 = 120;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_tracing(config.log_format)?;

    let dependencies = AppDependencies::connect(config).await?;
    let now = Utc::now();

    let customer = ensure_user(&dependencies, demo_customer(now)).await?;
    let driver = ensure_user(&dependencies, demo_driver(now)).await?;
    let site = ensure_site(&dependencies, now).await?;
    let vehicle = ensure_vehicle(&dependencies, &customer, now).await?;

    let active = dependencies
        .sessions()
        .find_sessions(queries::active_sessions(None))
        .await?;
    if active.is_empty() {
        let (session, runs) = parked_session(&customer, &vehicle, &site, &driver, now);
        dependencies.sessions().import_session(session, runs).await?;
        tracing::info!("created active parking session");
    } else {
        tracing::info!(count = active.len(), "active sessions already present");
    }

    let today = queries::start_of_day(now);
    let paid_today = dependencies
        .sessions()
        .find_sessions(queries::paid_sessions_since(today))
        .await?;
    if paid_today.is_empty() {
        for index in 1..=3 {
            let (session, runs) =
                completed_session(&customer, &vehicle, &site, &driver, (today, now), index);
            dependencies.sessions().import_session(session, runs).await?;
        }
        tracing::info!("created 3 completed parking sessions for today");
    } else {
        tracing::info!(count = paid_today.len(), "paid sessions for today already present");
    }

    tracing::info!(
        user_id = %customer.id,
        driver_id = %driver.id,
        site_id = %site.id,
        vehicle_id = %vehicle.id,
        "seed complete"
    );
    Ok(())
}

fn demo_customer(now: DateTime<Utc>) -> User {
    User::new(
        "Demo User".to_string(),
        DEMO_EMAIL.to_string(),
        Some("9876543210".to_string()),
        UserRole::User,
        now,
    )
}

fn demo_driver(now: DateTime<Utc>) -> User {
    User::new(
        "Ravi Kumar".to_string(),
        DRIVER_EMAIL.to_string(),
        Some("9123456780".to_string()),
        UserRole::Driver,
        now,
    )
}

async fn ensure_user(dependencies: &AppDependencies, user: User) -> anyhow::Result<User> {
    if let Some(existing) = dependencies
        .users()
        .find_user_by_email(user.email.clone())
        .await?
    {
        tracing::info!(user_id = %existing.id, email = %existing.email, "using existing user");
        return Ok(existing);
    }

    let created = dependencies.users().insert_user(user).await?;
    tracing::info!(user_id = %created.id, email = %created.email, "created user");
    Ok(created)
}

async fn ensure_site(dependencies: &AppDependencies, now: DateTime<Utc>) -> anyhow::Result<ParkingSite> {
    if let Some(existing) = dependencies.sites().list_sites().await?.into_iter().next() {
        tracing::info!(site_id = %existing.id, "using existing site");
        return Ok(existing);
    }

    let site = ParkingSite {
        id: SiteId::generate(),
        name: "Phoenix Marketcity".to_string(),
        address: Some("LBS Marg, Kurla West".to_string()),
        city: Some("Mumbai".to_string()),
        total_slots: SITE_SLOTS,
        available_slots: SITE_SLOTS,
        fixed_parking_fee: Decimal::new(150, 0),
        created_at: now,
    };
    let created = dependencies.sites().insert_site(site).await?;
    tracing::info!(site_id = %created.id, "created site");
    Ok(created)
}

async fn ensure_vehicle(
    dependencies: &AppDependencies,
    owner: &User,
    now: DateTime<Utc>,
) -> anyhow::Result<Vehicle> {
    if let Some(existing) = dependencies
        .vehicles()
        .list_vehicles(owner.id)
        .await?
        .into_iter()
        .next()
    {
        tracing::info!(vehicle_id = %existing.id, "using existing vehicle");
        return Ok(existing);
    }

    let vehicle = Vehicle {
        id: VehicleId::generate(),
        user_id: owner.id,
        vehicle_name: "Honda City".to_string(),
        plate_number: "MH 02 AB 1234".to_string(),
        vehicle_type: VehicleType::Sedan,
        created_at: now,
    };
    let created = dependencies.vehicles().insert_vehicle(vehicle).await?;
    tracing::info!(vehicle_id = %created.id, "created vehicle");
    Ok(created)
}

fn run(
    session: &ParkingSession,
    driver: &User,
    assignment_type: AssignmentType,
    assigned_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
) -> ValetAssignment {
    ValetAssignment {
        id: AssignmentId::generate(),
        session_id: session.id,
        driver_id: Some(driver.id),
        assignment_type,
        status: AssignmentStatus::Completed,
        assigned_at,
        completed_at: Some(completed_at),
    }
}

/// A car parked two hours ago at spot A-24, not yet paid.
fn parked_session(
    customer: &User,
    vehicle: &Vehicle,
    site: &ParkingSite,
    driver: &User,
    now: DateTime<Utc>,
) -> (ParkingSession, Vec<ValetAssignment>) {
    let entry_time = now - Duration::hours(2);
    let session = ParkingSession {
        id: SessionId::generate(),
        user_id: customer.id,
        vehicle_id: vehicle.id,
        site_id: site.id,
        parking_spot: Some("A-24".to_string()),
        entry_time,
        exit_time: None,
        status: SessionStatus::Active,
        payment_status: PaymentStatus::Pending,
        payment_amount: Some(site.fixed_parking_fee),
        payment_method: None,
    };
    let park = run(
        &session,
        driver,
        AssignmentType::Park,
        entry_time,
        entry_time + Duration::minutes(10),
    );
    (session, vec![park])
}

/// The `index`-th finished visit of the day, paid `150 + 50 * index` at spot
/// `A-2{index}`. The time elapsed since midnight is split into four parts;
/// visit `index` starts at the beginning of part `index` and lasts at most an
/// hour, so every visit lies between midnight and `now`.
fn completed_session(
    customer: &User,
    vehicle: &Vehicle,
    site: &ParkingSite,
    driver: &User,
    (today, now): (DateTime<Utc>, DateTime<Utc>),
    index: i32,
) -> (ParkingSession, Vec<ValetAssignment>) {
    let part = (now - today) / 4;
    let stay = part.min(Duration::hours(1));
    let leg = stay / 6;
    let entry_time = today + part * (index - 1);
    let exit_time = entry_time + stay;
    let session = ParkingSession {
        id: SessionId::generate(),
        user_id: customer.id,
        vehicle_id: vehicle.id,
        site_id: site.id,
        parking_spot: Some(format!("A-{}", 20 + index)),
        entry_time,
        exit_time: Some(exit_time),
        status: SessionStatus::Completed,
        payment_status: PaymentStatus::Paid,
        payment_amount: Some(Decimal::from(150 + index * 50)),
        payment_method: Some(MOCK_PAYMENT_METHOD.to_string()),
    };
    let runs = vec![
        run(
            &session,
            driver,
            AssignmentType::Park,
            entry_time,
            entry_time + leg,
        ),
        run(
            &session,
            driver,
            AssignmentType::Retrieve,
            exit_time - leg,
            exit_time,
        ),
    ];
    (session, runs)
}
