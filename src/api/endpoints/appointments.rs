//! Scheduling endpoints.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};
use crate::db;
use crate::export;
use crate::models::enums::{AppointmentType, AttendanceStatus, Role};
use crate::models::Appointment;

const SCHEDULING_ROLES: &[Role] = &[Role::Admin, Role::Doctor, Role::Midwife];

#[derive(Deserialize)]
pub struct AppointmentForm {
    pub chart_number: String,
    pub date: NaiveDate,
    /// "HH:MM", as the time picker submits it.
    pub time: String,
    pub appointment_type: AppointmentType,
    pub detail: Option<String>,
    pub duration_minutes: Option<i64>,
}

/// `POST /api/appointments` — book a visit. The response carries the
/// stored appointment; the printable confirmation is a separate GET so
/// the page can offer it as a download button.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Json(form): Json<AppointmentForm>,
) -> Result<Json<Appointment>, ApiError> {
    session.require_role(SCHEDULING_ROLES)?;

    let time = NaiveTime::parse_from_str(&form.time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(&form.time, "%H:%M:%S"))
        .map_err(|_| ApiError::BadRequest(format!("Invalid time: {}", form.time)))?;

    let conn = ctx.state.open_db()?;
    if db::get_patient_by_chart(&conn, &form.chart_number)?.is_none() {
        return Err(ApiError::NotFound(format!(
            "patient {} not found",
            form.chart_number
        )));
    }
    let created_by = db::get_user_by_username(&conn, &session.username)?.map(|u| u.id);

    let appointment = Appointment {
        id: Uuid::new_v4(),
        chart_number: form.chart_number,
        date: form.date,
        time,
        appointment_type: form.appointment_type,
        detail: form.detail,
        duration_minutes: form.duration_minutes,
        attended: AttendanceStatus::Pending,
        notes: None,
        created_by,
        created_at: chrono::Local::now().naive_local(),
        modified_at: None,
        modified_by: None,
    };
    db::insert_appointment(&conn, &appointment)?;

    Ok(Json(appointment))
}

/// `GET /api/appointments/:id/confirmation` — the one-page PDF handed to
/// the patient.
pub async fn confirmation(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    session.require_role(SCHEDULING_ROLES)?;

    let conn = ctx.state.open_db()?;
    let appointment = db::get_appointment(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("appointment {id} not found")))?;

    let bytes = export::appointment_confirmation_pdf(
        &appointment.chart_number,
        &appointment.date.to_string(),
        &appointment.time.format("%H:%M").to_string(),
        appointment.detail.as_deref().unwrap_or("—"),
    )?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"appointment_{}.pdf\"",
                    appointment.chart_number
                ),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub chart: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
}

/// `GET /api/appointments` — the search-and-filter listing.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    session.require_role(SCHEDULING_ROLES)?;

    let conn = ctx.state.open_db()?;
    let appointments = db::search_appointments(&conn, query.chart.as_deref(), query.date)?;
    Ok(Json(AppointmentsResponse { appointments }))
}

/// `GET /api/appointments/today` — the reminders panel.
pub async fn today(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    session.require_role(SCHEDULING_ROLES)?;

    let conn = ctx.state.open_db()?;
    let appointments = db::appointments_on(&conn, chrono::Local::now().date_naive())?;
    Ok(Json(AppointmentsResponse { appointments }))
}

#[derive(Deserialize)]
pub struct NotesRequest {
    pub notes: String,
}

/// `PUT /api/appointments/:id/notes` — update the free-text notes,
/// stamping who changed them and when.
pub async fn update_notes(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<NotesRequest>,
) -> Result<Json<Appointment>, ApiError> {
    session.require_role(SCHEDULING_ROLES)?;

    let conn = ctx.state.open_db()?;
    let editor = db::get_user_by_username(&conn, &session.username)?
        .ok_or(ApiError::Unauthorized)?;
    db::update_appointment_notes(
        &conn,
        &id,
        &req.notes,
        &editor.id,
        chrono::Local::now().naive_local(),
    )?;

    let appointment = db::get_appointment(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("appointment {id} not found")))?;
    Ok(Json(appointment))
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

/// `DELETE /api/appointments/:id`
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, ApiError> {
    session.require_role(SCHEDULING_ROLES)?;

    let conn = ctx.state.open_db()?;
    db::delete_appointment(&conn, &id)?;
    Ok(Json(DeletedResponse { deleted: true }))
}
