//! HTTP server lifecycle.
//!
//! Binds the clinic API router to a loopback address and serves it until
//! the process exits. The clinic runs this on a single workstation; there
//! is deliberately no TLS and no remote exposure.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::router::clinic_api_router;
use crate::state::AppState;

/// Bind and serve the clinic API. Runs until the process is stopped.
pub async fn run_server(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = clinic_api_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Clinic API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}
