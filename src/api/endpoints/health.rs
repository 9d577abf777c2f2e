//! Health endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::config;
use crate::db;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub tables: i64,
}

/// `GET /api/health` — liveness plus a cheap database probe.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let conn = ctx.state.open_db()?;
    let tables = db::count_tables(&conn).map_err(ApiError::from)?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: config::APP_VERSION,
        tables,
    }))
}
