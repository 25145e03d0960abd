//! `PostgreSQL` storage adapter.
//!
//! Plain `sqlx::query` / `query_as` over [`PgPool`]; rows are read into
//! `FromRow` structs and converted into domain records, with enum columns
//! stored as text. The schema lives in `migrations/`.
//!
//! Workflows run inside one transaction and lock every row they modify with
//! `SELECT ... FOR UPDATE`, always in the order vehicle, assignment, session,
//! site. Every method returns an [`AsyncIO`] that opens its own transaction
//! when awaited.

use chrono::{DateTime, Utc};
use lambars::effect::AsyncIO;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::application::commands::{
    AcceptRequest, CompleteParking, CompleteParkingSession, CompleteRetrieval,
    CreateParkingRequest, DriverChanges, MockPayment, RequestRetrieval, VehicleChanges,
};
use crate::application::ports::{
    AssignmentFilter, OpenedSession, SessionFilter, SessionOrder, SessionRepository,
    SiteRepository, StoreError, StoreIO, UserRepository, VehicleRepository, settle,
};
use crate::application::workflows;
use crate::domain::{
    AssignmentDetail, AssignmentId, DetailIndex, DetailSource, ParkingPayment, ParkingSession,
    ParkingSite, SessionDetail, SessionId, SessionStatus, SiteId, User, UserId, UserRole,
    ValetAssignment, Vehicle, VehicleId,
};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

macro_rules! user_columns {
    () => {
        "id, name, email, phone, role, is_available, created_at"
    };
}

macro_rules! vehicle_columns {
    () => {
        "id, user_id, vehicle_name, plate_number, vehicle_type, created_at"
    };
}

macro_rules! site_columns {
    () => {
        "id, name, address, city, total_slots, available_slots, fixed_parking_fee, created_at"
    };
}

macro_rules! session_columns {
    () => {
        "id, user_id, vehicle_id, site_id, parking_spot, entry_time, exit_time, status, \
         payment_status, payment_amount, payment_method"
    };
}

macro_rules! assignment_columns {
    () => {
        "id, session_id, driver_id, assignment_type, status, assigned_at, completed_at"
    };
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Maps a driver error, recognizing constraint violations by SQLSTATE.
fn store_error(error: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(database_error) = &error {
        let constraint = database_error.constraint().unwrap_or_default().to_string();
        match database_error.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return StoreError::UniqueViolation { constraint },
            Some(FOREIGN_KEY_VIOLATION) => return StoreError::InUse { constraint },
            _ => {}
        }
    }
    StoreError::Database(error.to_string())
}

fn corrupt(column: &str, error: impl std::fmt::Display) -> StoreError {
    StoreError::Database(format!("unreadable {column} column: {error}"))
}

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    role: String,
    is_available: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            name: row.name,
            email: row.email,
            phone: row.phone,
            role: row.role.parse().map_err(|error| corrupt("role", error))?,
            is_available: row.is_available,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct VehicleRow {
    id: Uuid,
    user_id: Uuid,
    vehicle_name: String,
    plate_number: String,
    vehicle_type: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<VehicleRow> for Vehicle {
    type Error = StoreError;

    fn try_from(row: VehicleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            user_id: row.user_id.into(),
            vehicle_name: row.vehicle_name,
            plate_number: row.plate_number,
            vehicle_type: row
                .vehicle_type
                .parse()
                .map_err(|error| corrupt("vehicle_type", error))?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct SiteRow {
    id: Uuid,
    name: String,
    address: Option<String>,
    city: Option<String>,
    total_slots: i32,
    available_slots: i32,
    fixed_parking_fee: Decimal,
    created_at: DateTime<Utc>,
}

impl TryFrom<SiteRow> for ParkingSite {
    type Error = StoreError;

    fn try_from(row: SiteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            name: row.name,
            address: row.address,
            city: row.city,
            total_slots: row.total_slots,
            available_slots: row.available_slots,
            fixed_parking_fee: row.fixed_parking_fee,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct SessionRow {
    id: Uuid,
    user_id: Uuid,
    vehicle_id: Uuid,
    site_id: Uuid,
    parking_spot: Option<String>,
    entry_time: DateTime<Utc>,
    exit_time: Option<DateTime<Utc>>,
    status: String,
    payment_status: String,
    payment_amount: Option<Decimal>,
    payment_method: Option<String>,
}

impl TryFrom<SessionRow> for ParkingSession {
    type Error = StoreError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            user_id: row.user_id.into(),
            vehicle_id: row.vehicle_id.into(),
            site_id: row.site_id.into(),
            parking_spot: row.parking_spot,
            entry_time: row.entry_time,
            exit_time: row.exit_time,
            status: row.status.parse().map_err(|error| corrupt("status", error))?,
            payment_status: row
                .payment_status
                .parse()
                .map_err(|error| corrupt("payment_status", error))?,
            payment_amount: row.payment_amount,
            payment_method: row.payment_method,
        })
    }
}

#[derive(Debug, FromRow)]
struct AssignmentRow {
    id: Uuid,
    session_id: Uuid,
    driver_id: Option<Uuid>,
    assignment_type: String,
    status: String,
    assigned_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<AssignmentRow> for ValetAssignment {
    type Error = StoreError;

    fn try_from(row: AssignmentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            session_id: row.session_id.into(),
            driver_id: row.driver_id.map(UserId::from),
            assignment_type: row
                .assignment_type
                .parse()
                .map_err(|error| corrupt("assignment_type", error))?,
            status: row.status.parse().map_err(|error| corrupt("status", error))?,
            assigned_at: row.assigned_at,
            completed_at: row.completed_at,
        })
    }
}

// =============================================================================
// Query Helpers
// =============================================================================

async fn select_one<R, T>(
    conn: &mut PgConnection,
    sql: &'static str,
    id: Uuid,
) -> Result<Option<T>, StoreError>
where
    R: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    T: TryFrom<R, Error = StoreError>,
{
    sqlx::query_as::<_, R>(sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(store_error)?
        .map(T::try_from)
        .transpose()
}

async fn select_many<R, T>(
    conn: &mut PgConnection,
    sql: &'static str,
    ids: Vec<Uuid>,
) -> Result<Vec<T>, StoreError>
where
    R: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    T: TryFrom<R, Error = StoreError>,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    sqlx::query_as::<_, R>(sql)
        .bind(ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(store_error)?
        .into_iter()
        .map(T::try_from)
        .collect()
}

async fn require_user(conn: &mut PgConnection, id: UserId) -> Result<User, StoreError> {
    select_one::<UserRow, User>(
        conn,
        concat!("SELECT ", user_columns!(), " FROM users WHERE id = $1"),
        id.into_uuid(),
    )
    .await?
    .ok_or_else(|| StoreError::not_found("user", id))
}

/// Serializes parking requests for one vehicle.
async fn lock_vehicle(conn: &mut PgConnection, id: VehicleId) -> Result<Vehicle, StoreError> {
    select_one::<VehicleRow, Vehicle>(
        conn,
        concat!(
            "SELECT ",
            vehicle_columns!(),
            " FROM vehicles WHERE id = $1 FOR UPDATE"
        ),
        id.into_uuid(),
    )
    .await?
    .ok_or_else(|| StoreError::not_found("vehicle", id))
}

async fn find_open_session(
    conn: &mut PgConnection,
    vehicle_id: VehicleId,
) -> Result<Option<ParkingSession>, StoreError> {
    let statuses: Vec<String> = SessionStatus::OPEN
        .iter()
        .map(|status| status.as_str().to_string())
        .collect();

    sqlx::query_as::<_, SessionRow>(concat!(
        "SELECT ",
        session_columns!(),
        " FROM parking_sessions WHERE vehicle_id = $1 AND status = ANY($2) LIMIT 1"
    ))
    .bind(vehicle_id.into_uuid())
    .bind(statuses)
    .fetch_optional(&mut *conn)
    .await
    .map_err(store_error)?
    .map(ParkingSession::try_from)
    .transpose()
}

async fn lock_site(conn: &mut PgConnection, id: SiteId) -> Result<ParkingSite, StoreError> {
    select_one::<SiteRow, ParkingSite>(
        conn,
        concat!(
            "SELECT ",
            site_columns!(),
            " FROM parking_sites WHERE id = $1 FOR UPDATE"
        ),
        id.into_uuid(),
    )
    .await?
    .ok_or_else(|| StoreError::not_found("parking site", id))
}

async fn lock_session(
    conn: &mut PgConnection,
    id: SessionId,
) -> Result<ParkingSession, StoreError> {
    select_one::<SessionRow, ParkingSession>(
        conn,
        concat!(
            "SELECT ",
            session_columns!(),
            " FROM parking_sessions WHERE id = $1 FOR UPDATE"
        ),
        id.into_uuid(),
    )
    .await?
    .ok_or_else(|| StoreError::not_found("parking session", id))
}

async fn lock_assignment(
    conn: &mut PgConnection,
    id: AssignmentId,
) -> Result<ValetAssignment, StoreError> {
    select_one::<AssignmentRow, ValetAssignment>(
        conn,
        concat!(
            "SELECT ",
            assignment_columns!(),
            " FROM valet_assignments WHERE id = $1 FOR UPDATE"
        ),
        id.into_uuid(),
    )
    .await?
    .ok_or_else(|| StoreError::not_found("valet assignment", id))
}

fn distinct(mut ids: Vec<Uuid>) -> Vec<Uuid> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Bulk-loads everything referenced by `sessions` and their runs.
async fn load_index(
    conn: &mut PgConnection,
    sessions: Vec<ParkingSession>,
) -> Result<DetailIndex, StoreError> {
    let assignments: Vec<ValetAssignment> = select_many::<AssignmentRow, _>(
        conn,
        concat!(
            "SELECT ",
            assignment_columns!(),
            " FROM valet_assignments WHERE session_id = ANY($1)"
        ),
        sessions.iter().map(|session| session.id.into_uuid()).collect(),
    )
    .await?;

    let user_ids = sessions
        .iter()
        .map(|session| session.user_id.into_uuid())
        .chain(
            assignments
                .iter()
                .filter_map(|assignment| assignment.driver_id.map(UserId::into_uuid)),
        )
        .collect();
    let users = select_many::<UserRow, _>(
        conn,
        concat!("SELECT ", user_columns!(), " FROM users WHERE id = ANY($1)"),
        distinct(user_ids),
    )
    .await?;
    let vehicles = select_many::<VehicleRow, _>(
        conn,
        concat!("SELECT ", vehicle_columns!(), " FROM vehicles WHERE id = ANY($1)"),
        distinct(
            sessions
                .iter()
                .map(|session| session.vehicle_id.into_uuid())
                .collect(),
        ),
    )
    .await?;
    let sites = select_many::<SiteRow, _>(
        conn,
        concat!("SELECT ", site_columns!(), " FROM parking_sites WHERE id = ANY($1)"),
        distinct(
            sessions
                .iter()
                .map(|session| session.site_id.into_uuid())
                .collect(),
        ),
    )
    .await?;

    Ok(DetailIndex::new(users, vehicles, sites, sessions, assignments))
}

// =============================================================================
// Write Helpers
// =============================================================================

async fn insert_session(conn: &mut PgConnection, session: &ParkingSession) -> Result<(), StoreError> {
    sqlx::query(concat!(
        "INSERT INTO parking_sessions (",
        session_columns!(),
        ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
    ))
    .bind(session.id.into_uuid())
    .bind(session.user_id.into_uuid())
    .bind(session.vehicle_id.into_uuid())
    .bind(session.site_id.into_uuid())
    .bind(&session.parking_spot)
    .bind(session.entry_time)
    .bind(session.exit_time)
    .bind(session.status.as_str())
    .bind(session.payment_status.as_str())
    .bind(session.payment_amount)
    .bind(&session.payment_method)
    .execute(&mut *conn)
    .await
    .map_err(store_error)?;
    Ok(())
}

async fn update_session(conn: &mut PgConnection, session: &ParkingSession) -> Result<(), StoreError> {
    sqlx::query(
        "UPDATE parking_sessions \
         SET parking_spot = $2, exit_time = $3, status = $4, payment_status = $5, \
             payment_amount = $6, payment_method = $7 \
         WHERE id = $1",
    )
    .bind(session.id.into_uuid())
    .bind(&session.parking_spot)
    .bind(session.exit_time)
    .bind(session.status.as_str())
    .bind(session.payment_status.as_str())
    .bind(session.payment_amount)
    .bind(&session.payment_method)
    .execute(&mut *conn)
    .await
    .map_err(store_error)?;
    Ok(())
}

async fn insert_assignment(
    conn: &mut PgConnection,
    assignment: &ValetAssignment,
) -> Result<(), StoreError> {
    sqlx::query(concat!(
        "INSERT INTO valet_assignments (",
        assignment_columns!(),
        ") VALUES ($1, $2, $3, $4, $5, $6, $7)"
    ))
    .bind(assignment.id.into_uuid())
    .bind(assignment.session_id.into_uuid())
    .bind(assignment.driver_id.map(UserId::into_uuid))
    .bind(assignment.assignment_type.as_str())
    .bind(assignment.status.as_str())
    .bind(assignment.assigned_at)
    .bind(assignment.completed_at)
    .execute(&mut *conn)
    .await
    .map_err(store_error)?;
    Ok(())
}

async fn update_assignment(
    conn: &mut PgConnection,
    assignment: &ValetAssignment,
) -> Result<(), StoreError> {
    sqlx::query(
        "UPDATE valet_assignments SET driver_id = $2, status = $3, completed_at = $4 WHERE id = $1",
    )
    .bind(assignment.id.into_uuid())
    .bind(assignment.driver_id.map(UserId::into_uuid))
    .bind(assignment.status.as_str())
    .bind(assignment.completed_at)
    .execute(&mut *conn)
    .await
    .map_err(store_error)?;
    Ok(())
}

async fn update_site_slots(conn: &mut PgConnection, site: &ParkingSite) -> Result<(), StoreError> {
    sqlx::query("UPDATE parking_sites SET available_slots = $2 WHERE id = $1")
        .bind(site.id.into_uuid())
        .bind(site.available_slots)
        .execute(&mut *conn)
        .await
        .map_err(store_error)?;
    Ok(())
}

async fn insert_payment(conn: &mut PgConnection, payment: &ParkingPayment) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO parking_payments \
         (id, session_id, user_id, amount, payment_method, payment_status, transaction_id, paid_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(payment.id.into_uuid())
    .bind(payment.session_id.into_uuid())
    .bind(payment.user_id.into_uuid())
    .bind(payment.amount)
    .bind(&payment.payment_method)
    .bind(&payment.payment_status)
    .bind(&payment.transaction_id)
    .bind(payment.paid_at)
    .execute(&mut *conn)
    .await
    .map_err(store_error)?;
    Ok(())
}

// =============================================================================
// Filters
// =============================================================================

fn push_session_filter(builder: &mut QueryBuilder<'static, Postgres>, filter: &SessionFilter) {
    if let Some(user_id) = filter.user_id {
        builder.push(" AND user_id = ").push_bind(user_id.into_uuid());
    }
    if let Some(site_id) = filter.site_id {
        builder.push(" AND site_id = ").push_bind(site_id.into_uuid());
    }
    if !filter.statuses.is_empty() {
        let statuses: Vec<String> = filter
            .statuses
            .iter()
            .map(|status| status.as_str().to_string())
            .collect();
        builder.push(" AND status = ANY(").push_bind(statuses).push(")");
    }
    if let Some(payment_status) = filter.payment_status {
        builder
            .push(" AND payment_status = ")
            .push_bind(payment_status.as_str());
    }
    if let Some(since) = filter.entered_since {
        builder.push(" AND entry_time >= ").push_bind(since);
    }
    builder.push(match filter.order {
        SessionOrder::NewestEntry => " ORDER BY entry_time DESC",
        SessionOrder::NewestExit => " ORDER BY exit_time DESC NULLS LAST, entry_time DESC",
    });
    if let Some(limit) = filter.limit {
        builder
            .push(" LIMIT ")
            .push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
    }
}

fn push_assignment_filter(builder: &mut QueryBuilder<'static, Postgres>, filter: &AssignmentFilter) {
    if let Some(driver_id) = filter.driver_id {
        builder.push(" AND driver_id = ").push_bind(driver_id.into_uuid());
    }
    if !filter.statuses.is_empty() {
        let statuses: Vec<String> = filter
            .statuses
            .iter()
            .map(|status| status.as_str().to_string())
            .collect();
        builder.push(" AND status = ANY(").push_bind(statuses).push(")");
    }
    if let Some(assignment_type) = filter.assignment_type {
        builder
            .push(" AND assignment_type = ")
            .push_bind(assignment_type.as_str());
    }
    builder.push(" ORDER BY assigned_at ASC");
}

// =============================================================================
// PostgreSQL Store
// =============================================================================

/// `PostgreSQL` implementation of every storage port.
///
/// ```ignore
/// let pool = PgPool::connect("postgres://localhost/valet").await?;
/// let store = PostgresStore::new(pool);
/// let sites = store.list_sites().await?;
/// ```
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl UserRepository for PostgresStore {
    fn find_user(&self, id: UserId) -> StoreIO<Option<User>> {
        let pool = self.pool.clone();

        AsyncIO::new(move || async move {
            let mut conn = pool.acquire().await.map_err(store_error)?;
            select_one::<UserRow, User>(
                &mut conn,
                concat!("SELECT ", user_columns!(), " FROM users WHERE id = $1"),
                id.into_uuid(),
            )
            .await
        })
    }

    fn find_user_by_email(&self, email: String) -> StoreIO<Option<User>> {
        let pool = self.pool.clone();

        AsyncIO::new(move || async move {
            sqlx::query_as::<_, UserRow>(concat!(
                "SELECT ",
                user_columns!(),
                " FROM users WHERE lower(email) = lower($1)"
            ))
            .bind(email)
            .fetch_optional(&pool)
            .await
            .map_err(store_error)?
            .map(User::try_from)
            .transpose()
        })
    }

    fn insert_user(&self, user: User) -> StoreIO<User> {
        let pool = self.pool.clone();

        AsyncIO::new(move || async move {
            sqlx::query(concat!(
                "INSERT INTO users (",
                user_columns!(),
                ") VALUES ($1, $2, $3, $4, $5, $6, $7)"
            ))
            .bind(user.id.into_uuid())
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(user.role.as_str())
            .bind(user.is_available)
            .bind(user.created_at)
            .execute(&pool)
            .await
            .map_err(store_error)?;
            Ok(user)
        })
    }

    fn list_drivers(&self) -> StoreIO<Vec<User>> {
        let pool = self.pool.clone();

        AsyncIO::new(move || async move {
            sqlx::query_as::<_, UserRow>(concat!(
                "SELECT ",
                user_columns!(),
                " FROM users WHERE role = $1 ORDER BY created_at DESC"
            ))
            .bind(UserRole::Driver.as_str())
            .fetch_all(&pool)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(User::try_from)
            .collect()
        })
    }

    fn update_driver(&self, id: UserId, changes: DriverChanges) -> StoreIO<User> {
        let pool = self.pool.clone();

        AsyncIO::new(move || async move {
            let mut transaction = pool.begin().await.map_err(store_error)?;

            let current = select_one::<UserRow, User>(
                &mut transaction,
                concat!(
                    "SELECT ",
                    user_columns!(),
                    " FROM users WHERE id = $1 AND role = 'driver' FOR UPDATE"
                ),
                id.into_uuid(),
            )
            .await?
            .ok_or_else(|| StoreError::not_found("driver", id))?;
            let updated = changes.apply_to(&current);

            sqlx::query(
                "UPDATE users SET name = $2, email = $3, phone = $4, is_available = $5 WHERE id = $1",
            )
            .bind(id.into_uuid())
            .bind(&updated.name)
            .bind(&updated.email)
            .bind(&updated.phone)
            .bind(updated.is_available)
            .execute(&mut *transaction)
            .await
            .map_err(store_error)?;

            transaction.commit().await.map_err(store_error)?;
            Ok(updated)
        })
    }

    fn delete_driver(&self, id: UserId) -> StoreIO<()> {
        let pool = self.pool.clone();

        AsyncIO::new(move || async move {
            let result = sqlx::query("DELETE FROM users WHERE id = $1 AND role = $2")
                .bind(id.into_uuid())
                .bind(UserRole::Driver.as_str())
                .execute(&pool)
                .await
                .map_err(store_error)?;

            if result.rows_affected() == 0 {
                return Err(StoreError::not_found("driver", id));
            }
            Ok(())
        })
    }
}

impl SiteRepository for PostgresStore {
    fn list_sites(&self) -> StoreIO<Vec<ParkingSite>> {
        let pool = self.pool.clone();

        AsyncIO::new(move || async move {
            sqlx::query_as::<_, SiteRow>(concat!(
                "SELECT ",
                site_columns!(),
                " FROM parking_sites ORDER BY name ASC"
            ))
            .fetch_all(&pool)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(ParkingSite::try_from)
            .collect()
        })
    }

    fn find_site(&self, id: SiteId) -> StoreIO<Option<ParkingSite>> {
        let pool = self.pool.clone();

        AsyncIO::new(move || async move {
            let mut conn = pool.acquire().await.map_err(store_error)?;
            select_one::<SiteRow, ParkingSite>(
                &mut conn,
                concat!("SELECT ", site_columns!(), " FROM parking_sites WHERE id = $1"),
                id.into_uuid(),
            )
            .await
        })
    }

    fn insert_site(&self, site: ParkingSite) -> StoreIO<ParkingSite> {
        let pool = self.pool.clone();

        AsyncIO::new(move || async move {
            sqlx::query(concat!(
                "INSERT INTO parking_sites (",
                site_columns!(),
                ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
            ))
            .bind(site.id.into_uuid())
            .bind(&site.name)
            .bind(&site.address)
            .bind(&site.city)
            .bind(site.total_slots)
            .bind(site.available_slots)
            .bind(site.fixed_parking_fee)
            .bind(site.created_at)
            .execute(&pool)
            .await
            .map_err(store_error)?;
            Ok(site)
        })
    }
}

impl VehicleRepository for PostgresStore {
    fn list_vehicles(&self, user_id: UserId) -> StoreIO<Vec<Vehicle>> {
        let pool = self.pool.clone();

        AsyncIO::new(move || async move {
            sqlx::query_as::<_, VehicleRow>(concat!(
                "SELECT ",
                vehicle_columns!(),
                " FROM vehicles WHERE user_id = $1 ORDER BY created_at DESC"
            ))
            .bind(user_id.into_uuid())
            .fetch_all(&pool)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(Vehicle::try_from)
            .collect()
        })
    }

    fn insert_vehicle(&self, vehicle: Vehicle) -> StoreIO<Vehicle> {
        let pool = self.pool.clone();

        AsyncIO::new(move || async move {
            let mut conn = pool.acquire().await.map_err(store_error)?;
            require_user(&mut conn, vehicle.user_id).await?;

            sqlx::query(concat!(
                "INSERT INTO vehicles (",
                vehicle_columns!(),
                ") VALUES ($1, $2, $3, $4, $5, $6)"
            ))
            .bind(vehicle.id.into_uuid())
            .bind(vehicle.user_id.into_uuid())
            .bind(&vehicle.vehicle_name)
            .bind(&vehicle.plate_number)
            .bind(vehicle.vehicle_type.as_str())
            .bind(vehicle.created_at)
            .execute(&mut *conn)
            .await
            .map_err(store_error)?;
            Ok(vehicle)
        })
    }

    fn update_vehicle(&self, id: VehicleId, changes: VehicleChanges) -> StoreIO<Vehicle> {
        let pool = self.pool.clone();

        AsyncIO::new(move || async move {
            let mut transaction = pool.begin().await.map_err(store_error)?;

            let current = select_one::<VehicleRow, Vehicle>(
                &mut transaction,
                concat!(
                    "SELECT ",
                    vehicle_columns!(),
                    " FROM vehicles WHERE id = $1 FOR UPDATE"
                ),
                id.into_uuid(),
            )
            .await?
            .ok_or_else(|| StoreError::not_found("vehicle", id))?;
            let updated = changes.apply_to(&current);

            sqlx::query(
                "UPDATE vehicles SET vehicle_name = $2, plate_number = $3, vehicle_type = $4 \
                 WHERE id = $1",
            )
            .bind(id.into_uuid())
            .bind(&updated.vehicle_name)
            .bind(&updated.plate_number)
            .bind(updated.vehicle_type.as_str())
            .execute(&mut *transaction)
            .await
            .map_err(store_error)?;

            transaction.commit().await.map_err(store_error)?;
            Ok(updated)
        })
    }

    fn delete_vehicle(&self, id: VehicleId) -> StoreIO<Vehicle> {
        let pool = self.pool.clone();

        AsyncIO::new(move || async move {
            sqlx::query_as::<_, VehicleRow>(concat!(
                "DELETE FROM vehicles WHERE id = $1 RETURNING ",
                vehicle_columns!()
            ))
            .bind(id.into_uuid())
            .fetch_optional(&pool)
            .await
            .map_err(store_error)?
            .map(Vehicle::try_from)
            .transpose()?
            .ok_or_else(|| StoreError::not_found("vehicle", id))
        })
    }
}

impl SessionRepository for PostgresStore {
    fn find_sessions(&self, filter: SessionFilter) -> StoreIO<Vec<SessionDetail>> {
        let pool = self.pool.clone();

        AsyncIO::new(move || async move {
            let mut conn = pool.acquire().await.map_err(store_error)?;
            let mut builder = QueryBuilder::<Postgres>::new(concat!(
                "SELECT ",
                session_columns!(),
                " FROM parking_sessions WHERE TRUE"
            ));
            push_session_filter(&mut builder, &filter);

            let sessions: Vec<ParkingSession> = builder
                .build_query_as::<SessionRow>()
                .fetch_all(&mut *conn)
                .await
                .map_err(store_error)?
                .into_iter()
                .map(ParkingSession::try_from)
                .collect::<Result<_, _>>()?;

            let index = load_index(&mut conn, sessions.clone()).await?;
            Ok(sessions
                .iter()
                .map(|session| index.session_detail(session))
                .collect())
        })
    }

    fn find_assignments(&self, filter: AssignmentFilter) -> StoreIO<Vec<AssignmentDetail>> {
        let pool = self.pool.clone();

        AsyncIO::new(move || async move {
            let mut conn = pool.acquire().await.map_err(store_error)?;
            let mut builder = QueryBuilder::<Postgres>::new(concat!(
                "SELECT ",
                assignment_columns!(),
                " FROM valet_assignments WHERE TRUE"
            ));
            push_assignment_filter(&mut builder, &filter);

            let assignments: Vec<ValetAssignment> = builder
                .build_query_as::<AssignmentRow>()
                .fetch_all(&mut *conn)
                .await
                .map_err(store_error)?
                .into_iter()
                .map(ValetAssignment::try_from)
                .collect::<Result<_, _>>()?;

            let sessions = select_many::<SessionRow, ParkingSession>(
                &mut conn,
                concat!(
                    "SELECT ",
                    session_columns!(),
                    " FROM parking_sessions WHERE id = ANY($1)"
                ),
                distinct(
                    assignments
                        .iter()
                        .map(|assignment| assignment.session_id.into_uuid())
                        .collect(),
                ),
            )
            .await?;
            let index = load_index(&mut conn, sessions).await?;

            Ok(assignments
                .iter()
                .map(|assignment| index.assignment_detail(assignment))
                .collect())
        })
    }

    fn import_session(
        &self,
        session: ParkingSession,
        assignments: Vec<ValetAssignment>,
    ) -> StoreIO<()> {
        let pool = self.pool.clone();

        AsyncIO::new(move || async move {
            let mut transaction = pool.begin().await.map_err(store_error)?;
            let site = lock_site(&mut transaction, session.site_id).await?;
            let site = settle(workflows::import_session(&session, &site))?;

            insert_session(&mut transaction, &session).await?;
            update_site_slots(&mut transaction, &site).await?;
            for assignment in &assignments {
                insert_assignment(&mut transaction, assignment).await?;
            }
            transaction.commit().await.map_err(store_error)
        })
    }

    fn open_session(
        &self,
        command: CreateParkingRequest,
        now: DateTime<Utc>,
    ) -> StoreIO<OpenedSession> {
        let pool = self.pool.clone();

        AsyncIO::new(move || async move {
            let mut transaction = pool.begin().await.map_err(store_error)?;

            let user = require_user(&mut transaction, command.user_id).await?;
            let vehicle = lock_vehicle(&mut transaction, command.vehicle_id).await?;
            let open = find_open_session(&mut transaction, vehicle.id).await?;
            let site = lock_site(&mut transaction, command.site_id).await?;
            let requested = settle(workflows::create_parking_request(
                &user,
                &vehicle,
                &site,
                open.as_ref(),
                now,
            ))?;

            insert_session(&mut transaction, &requested.session).await?;
            insert_assignment(&mut transaction, &requested.assignment).await?;
            update_site_slots(&mut transaction, &requested.site).await?;
            transaction.commit().await.map_err(store_error)?;

            let index = DetailIndex::new(
                vec![user],
                vec![vehicle],
                vec![requested.site],
                vec![requested.session.clone()],
                vec![requested.assignment.clone()],
            );
            Ok(OpenedSession {
                session: index.session_detail(&requested.session),
                assignment: requested.assignment,
            })
        })
    }

    fn request_retrieval(
        &self,
        command: RequestRetrieval,
        now: DateTime<Utc>,
    ) -> StoreIO<ValetAssignment> {
        let pool = self.pool.clone();

        AsyncIO::new(move || async move {
            let mut transaction = pool.begin().await.map_err(store_error)?;

            let session = lock_session(&mut transaction, command.session_id).await?;
            let user = require_user(&mut transaction, command.user_id).await?;
            let requested = settle(workflows::request_retrieval(&session, &user, now))?;

            update_session(&mut transaction, &requested.session).await?;
            insert_assignment(&mut transaction, &requested.assignment).await?;
            transaction.commit().await.map_err(store_error)?;

            Ok(requested.assignment)
        })
    }

    fn accept_assignment(&self, command: AcceptRequest) -> StoreIO<AssignmentDetail> {
        let pool = self.pool.clone();

        AsyncIO::new(move || async move {
            let mut transaction = pool.begin().await.map_err(store_error)?;

            let assignment = lock_assignment(&mut transaction, command.assignment_id).await?;
            let driver = require_user(&mut transaction, command.driver_id).await?;
            let accepted = settle(workflows::accept_request(&assignment, &driver))?;

            update_assignment(&mut transaction, &accepted).await?;
            let session = lock_session(&mut transaction, accepted.session_id).await?;
            let index = load_index(&mut transaction, vec![session]).await?;
            transaction.commit().await.map_err(store_error)?;

            Ok(index.assignment_detail(&accepted))
        })
    }

    fn complete_parking(
        &self,
        command: CompleteParking,
        now: DateTime<Utc>,
    ) -> StoreIO<ValetAssignment> {
        let pool = self.pool.clone();

        AsyncIO::new(move || async move {
            let mut transaction = pool.begin().await.map_err(store_error)?;

            let assignment = lock_assignment(&mut transaction, command.assignment_id).await?;
            let session = lock_session(&mut transaction, assignment.session_id).await?;
            let completed = settle(workflows::complete_parking(
                &assignment,
                &session,
                &command.parking_spot,
                now,
            ))?;

            update_assignment(&mut transaction, &completed.assignment).await?;
            update_session(&mut transaction, &completed.session).await?;
            transaction.commit().await.map_err(store_error)?;

            Ok(completed.assignment)
        })
    }

    fn complete_retrieval(
        &self,
        command: CompleteRetrieval,
        now: DateTime<Utc>,
    ) -> StoreIO<ValetAssignment> {
        let pool = self.pool.clone();

        AsyncIO::new(move || async move {
            let mut transaction = pool.begin().await.map_err(store_error)?;

            let assignment = lock_assignment(&mut transaction, command.assignment_id).await?;
            let session = lock_session(&mut transaction, assignment.session_id).await?;
            let site = lock_site(&mut transaction, session.site_id).await?;
            let completed =
                settle(workflows::complete_retrieval(&assignment, &session, &site, now))?;

            update_assignment(&mut transaction, &completed.assignment).await?;
            update_session(&mut transaction, &completed.session).await?;
            update_site_slots(&mut transaction, &completed.site).await?;
            transaction.commit().await.map_err(store_error)?;

            Ok(completed.assignment)
        })
    }

    fn record_payment(
        &self,
        command: MockPayment,
        now: DateTime<Utc>,
    ) -> StoreIO<ParkingSession> {
        let pool = self.pool.clone();

        AsyncIO::new(move || async move {
            let mut transaction = pool.begin().await.map_err(store_error)?;

            let session = lock_session(&mut transaction, command.session_id).await?;
            let recorded = settle(workflows::record_payment(&session, command.amount, now))?;

            update_session(&mut transaction, &recorded.session).await?;
            insert_payment(&mut transaction, &recorded.payment).await?;
            transaction.commit().await.map_err(store_error)?;

            Ok(recorded.session)
        })
    }

    fn check_out(
        &self,
        command: CompleteParkingSession,
        now: DateTime<Utc>,
    ) -> StoreIO<ParkingSession> {
        let pool = self.pool.clone();

        AsyncIO::new(move || async move {
            let mut transaction = pool.begin().await.map_err(store_error)?;

            let session = lock_session(&mut transaction, command.session_id).await?;
            let site = lock_site(&mut transaction, session.site_id).await?;
            let checked_out = settle(workflows::check_out(&session, &site, now))?;

            update_session(&mut transaction, &checked_out.session).await?;
            update_site_slots(&mut transaction, &checked_out.site).await?;
            transaction.commit().await.map_err(store_error)?;

            Ok(checked_out.session)
        })
    }
}
