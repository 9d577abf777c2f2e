//! Clinic API router.
//!
//! Exposes the data-entry operations as HTTP/JSON endpoints for the
//! clinic's form pages. Routes are nested under `/api/`; everything but
//! login, registration, and password reset sits behind the session
//! middleware.
//!
//! The router is composable — `clinic_api_router()` returns a `Router`
//! that can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::clinic_api_router;
pub use server::run_server;
pub use types::ApiContext;
