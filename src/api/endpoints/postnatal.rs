//! Birth, postpartum, and vaccination form endpoints.

use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};
use crate::db;
use crate::models::{BirthRecord, PostpartumRecord, VaccinationRecord};

#[derive(Deserialize)]
pub struct ChartQuery {
    pub chart_number: Option<String>,
}

fn ensure_chart_exists(
    conn: &rusqlite::Connection,
    chart_number: &str,
) -> Result<(), ApiError> {
    if db::get_patient_by_chart(conn, chart_number)?.is_none() {
        return Err(ApiError::NotFound(format!(
            "patient {chart_number} not found"
        )));
    }
    Ok(())
}

// ─── Births ───────────────────────────────────────────────────────────────────

/// `POST /api/births`
pub async fn create_birth(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Json(mut record): Json<BirthRecord>,
) -> Result<Json<BirthRecord>, ApiError> {
    session.require_clinical()?;
    record.id = Uuid::new_v4();

    let conn = ctx.state.open_db()?;
    ensure_chart_exists(&conn, &record.chart_number)?;
    db::insert_birth_record(&conn, &record)?;
    Ok(Json(record))
}

#[derive(Serialize)]
pub struct BirthsResponse {
    pub records: Vec<BirthRecord>,
}

/// `GET /api/births`
pub async fn list_births(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<BirthsResponse>, ApiError> {
    session.require_clinical()?;

    let conn = ctx.state.open_db()?;
    let records = db::list_birth_records(&conn, query.chart_number.as_deref())?;
    Ok(Json(BirthsResponse { records }))
}

// ─── Postpartum ───────────────────────────────────────────────────────────────

/// `POST /api/postpartum`
pub async fn create_postpartum(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Json(mut record): Json<PostpartumRecord>,
) -> Result<Json<PostpartumRecord>, ApiError> {
    session.require_clinical()?;
    record.id = Uuid::new_v4();

    let conn = ctx.state.open_db()?;
    ensure_chart_exists(&conn, &record.chart_number)?;
    db::insert_postpartum_record(&conn, &record)?;
    Ok(Json(record))
}

#[derive(Serialize)]
pub struct PostpartumResponse {
    pub records: Vec<PostpartumRecord>,
}

/// `GET /api/postpartum`
pub async fn list_postpartum(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<PostpartumResponse>, ApiError> {
    session.require_clinical()?;

    let conn = ctx.state.open_db()?;
    let records = db::list_postpartum_records(&conn, query.chart_number.as_deref())?;
    Ok(Json(PostpartumResponse { records }))
}

// ─── Vaccinations ─────────────────────────────────────────────────────────────

/// `POST /api/vaccinations`
pub async fn create_vaccination(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Json(mut record): Json<VaccinationRecord>,
) -> Result<Json<VaccinationRecord>, ApiError> {
    session.require_clinical()?;

    if record.vaccine_type.trim().is_empty() {
        return Err(ApiError::BadRequest("Vaccine type is required".into()));
    }
    record.id = Uuid::new_v4();

    let conn = ctx.state.open_db()?;
    ensure_chart_exists(&conn, &record.chart_number)?;
    db::insert_vaccination(&conn, &record)?;
    Ok(Json(record))
}

#[derive(Serialize)]
pub struct VaccinationsResponse {
    pub records: Vec<VaccinationRecord>,
}

/// `GET /api/vaccinations`
pub async fn list_vaccinations(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<VaccinationsResponse>, ApiError> {
    session.require_clinical()?;

    let conn = ctx.state.open_db()?;
    let records = db::list_vaccinations(&conn, query.chart_number.as_deref())?;
    Ok(Json(VaccinationsResponse { records }))
}
