//! Form-based front-end — REST API over the same wizard core.

pub mod routes;

pub use routes::{WebState, routes};

use std::sync::Arc;

use crate::recommend::Requester;

/// Serve the web API on the given port until the process is stopped.
pub async fn serve(requester: Arc<Requester>, port: u16) -> anyhow::Result<()> {
    let state = WebState::new(requester);
    let app = routes(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    tracing::info!(port, "Web API started");
    axum::serve(listener, app).await?;
    Ok(())
}
