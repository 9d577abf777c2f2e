//! Request logging middleware.
//!
//! Logs every API request with method, path, the session's username when
//! one is attached, and the response status. Runs innermost, after auth
//! has injected `SessionContext`.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::SessionContext;

pub async fn log_request(
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let username = req
        .extensions()
        .get::<SessionContext>()
        .map(|s| s.username.clone())
        .unwrap_or_else(|| "-".to_string());

    let response = next.run(req).await;

    tracing::info!(
        %method,
        %path,
        %username,
        status = response.status().as_u16(),
        "request"
    );

    response
}
