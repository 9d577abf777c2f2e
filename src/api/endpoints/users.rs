//! User-management endpoints (admin only).

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};
use crate::db;
use crate::export;
use crate::models::enums::{Dataset, Role};
use crate::models::User;
use crate::reports;

#[derive(Deserialize)]
pub struct ListQuery {
    pub username: Option<String>,
    pub role: Option<String>,
}

#[derive(Serialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

/// `GET /api/users` — list accounts, with the management page's
/// username-substring and role filters.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<UsersResponse>, ApiError> {
    session.require_admin()?;

    let role = match query.role.as_deref() {
        Some(r) => Some(
            Role::from_str(r)
                .map_err(|_| ApiError::BadRequest(format!("Unknown role filter: {r}")))?,
        ),
        None => None,
    };

    let conn = ctx.state.open_db()?;
    let users = db::list_users(&conn, query.username.as_deref(), role)?;
    Ok(Json(UsersResponse { users }))
}

#[derive(Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[derive(Serialize)]
pub struct UpdatedResponse {
    pub updated: bool,
}

/// `PUT /api/users/:id/role` — change an account's professional title.
pub async fn update_role(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<UpdatedResponse>, ApiError> {
    session.require_admin()?;

    let role = Role::from_str(&req.role)
        .map_err(|_| ApiError::BadRequest(format!("Unknown role: {}", req.role)))?;

    let conn = ctx.state.open_db()?;
    db::update_user_role(&conn, &id, role)?;
    Ok(Json(UpdatedResponse { updated: true }))
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

/// `DELETE /api/users/:id` — remove an account and end any sessions it
/// still holds.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, ApiError> {
    session.require_admin()?;

    let conn = ctx.state.open_db()?;
    let user = db::get_user(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;
    db::delete_user(&conn, &id)?;
    ctx.state.sessions()?.revoke_user(&user.username);

    tracing::info!(username = %user.username, deleted_by = %session.username, "account deleted");
    Ok(Json(DeletedResponse { deleted: true }))
}

/// `GET /api/users/export` — the account list as a CSV download
/// (username/role/email only, never hashes).
pub async fn export_csv(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Response, ApiError> {
    session.require_admin()?;

    let conn = ctx.state.open_db()?;
    let table = reports::fetch_table(&conn, Dataset::Users)?;
    let bytes = export::table_to_csv(&table)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"users.csv\"".to_string(),
            ),
        ],
        bytes,
    )
        .into_response())
}
