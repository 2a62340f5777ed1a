//! Server setup and lifecycle.

use crate::routes::create_router;
use crate::state::AppState;
use gremview_core::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

/// The Gremview HTTP server.
pub struct Server {
    state: Arc<AppState>,
    addr: String,
}

impl Server {
    /// Creates a server that will listen on `addr` (`host:port`).
    pub fn new(state: AppState, addr: impl Into<String>) -> Self {
        Self {
            state: Arc::new(state),
            addr: addr.into(),
        }
    }

    /// Creates a server listening on the configured `[server]` address.
    pub fn from_state(state: AppState) -> Self {
        let addr = state.config().server_addr();
        Self::new(state, addr)
    }

    /// The address the server binds.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Runs until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(&self.addr).await?;
        let local = listener.local_addr()?;
        tracing::info!(addr = %local, "Gremview server starting");

        axum::serve(listener, create_router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Gremview server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Cannot listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        },
        () = terminate => {
            tracing::info!("Received terminate signal, shutting down");
        },
    }
}
