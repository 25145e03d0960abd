//! Valet parking API server.
//!
//! Reads configuration from the environment (and `.env`), connects to
//! Postgres when `DATABASE_URL` is set and serves the REST API until Ctrl+C
//! or SIGTERM.

use valet::api::{Server, create_router};
use valet::infrastructure::{AppConfig, AppDependencies, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_tracing(config.log_format)?;

    tracing::info!(
        host = %config.app_host,
        port = config.app_port,
        "starting valet server"
    );

    let server = Server::new(config.socket_address());
    let dependencies = AppDependencies::connect(config).await?;

    server.run(create_router(dependencies)).await
}
