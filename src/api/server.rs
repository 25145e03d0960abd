//! HTTP server with graceful shutdown.

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;

/// Binds `address` and serves `router` until Ctrl+C or SIGTERM.
pub struct Server {
    address: String,
}

impl Server {
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Runs until a shutdown signal arrives and in-flight requests finish.
    ///
    /// # Errors
    ///
    /// Fails if the address cannot be bound or the server stops with an I/O
    /// error.
    pub async fn run(self, router: Router) -> anyhow::Result<()> {
        let listener = TcpListener::bind(&self.address).await?;

        tracing::info!(address = %self.address, "server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("server shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!(%error, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
