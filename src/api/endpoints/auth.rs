//! Login, registration, and password reset endpoints.

use std::str::FromStr;

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};
use crate::auth;
use crate::models::enums::Role;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub password_confirm: String,
    /// Professional title. Parsed leniently so legacy spellings
    /// ("Sage-femme", "médecin") keep working.
    pub role: String,
    pub email: Option<String>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub username: String,
    pub role: Role,
}

/// `POST /api/auth/register` — create an account.
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let role = Role::from_str(&req.role)
        .map_err(|_| ApiError::BadRequest(format!("Unknown professional title: {}", req.role)))?;

    let conn = ctx.state.open_db()?;
    let user = auth::register(
        &conn,
        &req.username,
        &req.password,
        &req.password_confirm,
        role,
        req.email.as_deref(),
        chrono::Local::now().naive_local(),
    )?;

    Ok(Json(RegisterResponse {
        username: user.username,
        role: user.role,
    }))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub role: Role,
}

/// `POST /api/auth/login` — check credentials and start a session.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let conn = ctx.state.open_db()?;
    let user = auth::authenticate(&conn, &req.username, &req.password)?;

    let token = ctx.state.sessions()?.issue(
        &user.username,
        user.role,
        chrono::Local::now().naive_local(),
    );

    Ok(Json(LoginResponse {
        token,
        username: user.username,
        role: user.role,
    }))
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub logged_out: bool,
}

/// `POST /api/auth/logout` — end the current session, dropping its
/// wizard state and drafts with it.
pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<LogoutResponse>, ApiError> {
    let logged_out = ctx.state.sessions()?.revoke(&session.token);
    Ok(Json(LogoutResponse { logged_out }))
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub username: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

#[derive(Serialize)]
pub struct ResetPasswordResponse {
    pub reset: bool,
}

/// `POST /api/auth/reset-password` — the "forgot password" page.
pub async fn reset_password(
    State(ctx): State<ApiContext>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<ResetPasswordResponse>, ApiError> {
    let conn = ctx.state.open_db()?;
    auth::reset_password(
        &conn,
        &req.username,
        &req.new_password,
        &req.new_password_confirm,
    )?;
    Ok(Json(ResetPasswordResponse { reset: true }))
}
