//! Infrastructure layer: configuration, storage adapters and wiring.

pub mod config;
pub mod dependencies;
pub mod memory;
pub mod postgres;
pub mod telemetry;

pub use config::{AppConfig, ConfigError, LogFormat};
pub use dependencies::{AppDependencies, SetupError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use telemetry::init_tracing;
