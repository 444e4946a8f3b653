//! Server Implementation
//!
//! HTTP 服务器启动和优雅关闭

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::api;
use crate::core::{BoxError, ServerState};
use crate::db::LaundryStore;

/// HTTP Server
pub struct Server<S: LaundryStore> {
    state: ServerState<S>,
}

impl<S: LaundryStore> Server<S> {
    pub fn new(state: ServerState<S>) -> Self {
        Self { state }
    }

    /// Serve until Ctrl+C
    pub async fn run(self) -> Result<(), BoxError> {
        let config = &self.state.config;
        let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
        let app = api::build_app(self.state.clone());

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(
            environment = %config.environment,
            country = %config.operating_country,
            "Laundry server listening on {}",
            addr
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}
