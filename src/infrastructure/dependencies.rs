//! Dependency container shared as axum state.
//!
//! ```rust,ignore
//! use valet::infrastructure::{AppConfig, AppDependencies};
//!
//! let config = AppConfig::from_env()?;
//! let dependencies = AppDependencies::connect(config).await?;
//! ```

use std::sync::Arc;

use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use super::config::AppConfig;
use super::memory::InMemoryStore;
use super::postgres::PostgresStore;
use crate::application::ports::{
    SessionRepository, SiteRepository, UserRepository, VehicleRepository,
};

/// Failure while preparing the storage backend.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("cannot connect to the database: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("cannot apply migrations: {0}")]
    Migrate(#[from] MigrateError),
}

/// Application dependency container.
///
/// Every port sits behind a trait object so handlers never know which
/// adapter they talk to.
#[derive(Clone)]
pub struct AppDependencies {
    config: AppConfig,
    users: Arc<dyn UserRepository>,
    sites: Arc<dyn SiteRepository>,
    vehicles: Arc<dyn VehicleRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl AppDependencies {
    #[must_use]
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        sites: Arc<dyn SiteRepository>,
        vehicles: Arc<dyn VehicleRepository>,
        sessions: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            config,
            users,
            sites,
            vehicles,
            sessions,
        }
    }

    /// Wires every port to one adapter.
    #[must_use]
    pub fn from_store<S>(config: AppConfig, store: S) -> Self
    where
        S: UserRepository
            + SiteRepository
            + VehicleRepository
            + SessionRepository
            + Clone
            + 'static,
    {
        Self::new(
            config,
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store),
        )
    }

    /// Picks the backend from `config`: Postgres when `DATABASE_URL` is set
    /// (applying migrations unless disabled), otherwise an empty
    /// [`InMemoryStore`].
    ///
    /// # Errors
    ///
    /// [`SetupError`] if the pool cannot connect or a migration fails.
    pub async fn connect(config: AppConfig) -> Result<Self, SetupError> {
        let Some(url) = config.database_url.clone() else {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            return Ok(Self::from_store(config, InMemoryStore::new()));
        };

        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&url)
            .await?;
        tracing::info!(
            max_connections = config.database_max_connections,
            "connected to Postgres"
        );

        if config.run_migrations {
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("migrations applied");
        }

        Ok(Self::from_store(config, PostgresStore::new(pool)))
    }

    /// Default configuration over an empty [`InMemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(AppConfig::default(), InMemoryStore::new())
    }

    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }

    #[must_use]
    pub fn sites(&self) -> &dyn SiteRepository {
        self.sites.as_ref()
    }

    #[must_use]
    pub fn vehicles(&self) -> &dyn VehicleRepository {
        self.vehicles.as_ref()
    }

    #[must_use]
    pub fn sessions(&self) -> &dyn SessionRepository {
        self.sessions.as_ref()
    }
}

impl std::fmt::Debug for AppDependencies {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AppDependencies")
            .field("config", &self.config)
            .field("users", &"<dyn UserRepository>")
            .field("sites", &"<dyn SiteRepository>")
            .field("vehicles", &"<dyn VehicleRepository>")
            .field("sessions", &"<dyn SessionRepository>")
            .finish()
    }
}
