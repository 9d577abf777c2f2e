//! Session-token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, validates it against the
//! in-memory session store (refreshing the inactivity clock), and
//! injects `SessionContext` into request extensions for downstream
//! handlers.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};

/// Require a valid session token.
pub async fn require_session(
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    match require_session_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_session_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    let session_ctx = {
        let mut sessions = ctx.state.sessions()?;
        let session = sessions.validate(&token).ok_or(ApiError::Unauthorized)?;
        SessionContext {
            token: token.clone(),
            username: session.username.clone(),
            role: session.role,
        }
    }; // RwLockWriteGuard dropped here, before any .await

    req.extensions_mut().insert(session_ctx);
    Ok(next.run(req).await)
}
