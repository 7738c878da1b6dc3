//! HTTP server lifecycle

use std::future::Future;

use tokio::net::TcpListener;
use tracing::info;

use crate::{routes, state::AppState};

/// Axum server bound to one address
pub struct ApiServer {
    state: AppState,
    bind_address: String,
}

impl ApiServer {
    /// Create a server for the given state
    pub fn new(state: AppState, bind_address: impl Into<String>) -> Self {
        Self {
            state,
            bind_address: bind_address.into(),
        }
    }

    /// Address the server listens on
    pub fn bind_address(&self) -> &str {
        &self.bind_address
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests
    pub async fn serve<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(&self.bind_address).await?;
        info!(address = %listener.local_addr()?, "ERM API listening");
        info!("Swagger UI available at /swagger-ui");

        axum::serve(listener, routes::router(self.state))
            .with_graceful_shutdown(shutdown)
            .await
    }
}
