//! Demographic intake endpoints.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};
use crate::db;
use crate::models::enums::Eligibility;
use crate::models::Patient;

#[derive(Deserialize)]
pub struct PatientForm {
    pub chart_number: String,
    pub dob: Option<NaiveDate>,
    pub date_of_referral: Option<NaiveDate>,
    pub community_of_residence: Option<String>,
    pub status: Option<String>,
    pub referred_by: Option<String>,
    pub reason_for_referral: Option<String>,
    #[serde(default)]
    pub successful_first_contact: bool,
    pub eligible_to_midwifery_care: Eligibility,
    pub reason_for_non_eligibility: Option<String>,
    pub weeks_at_first_appointment: Option<f64>,
    pub reason_if_never_seen: Option<String>,
}

/// `POST /api/patients` — submit the demographics form.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Json(form): Json<PatientForm>,
) -> Result<Json<Patient>, ApiError> {
    session.require_clinical()?;

    if form.chart_number.trim().is_empty() {
        return Err(ApiError::BadRequest("Chart number is required".into()));
    }

    let patient = Patient {
        id: Uuid::new_v4(),
        chart_number: form.chart_number.trim().to_string(),
        dob: form.dob,
        date_of_referral: form.date_of_referral,
        community_of_residence: form.community_of_residence,
        status: form.status,
        referred_by: form.referred_by,
        reason_for_referral: form.reason_for_referral,
        successful_first_contact: form.successful_first_contact,
        eligible_to_midwifery_care: form.eligible_to_midwifery_care,
        reason_for_non_eligibility: form.reason_for_non_eligibility,
        weeks_at_first_appointment: form.weeks_at_first_appointment,
        reason_if_never_seen: form.reason_if_never_seen,
        created_at: chrono::Local::now().naive_local(),
    };

    let conn = ctx.state.open_db()?;
    match db::insert_patient(&conn, &patient) {
        Ok(()) => Ok(Json(patient)),
        Err(e) if e.is_unique_violation() => Err(ApiError::Conflict(format!(
            "Chart number {} already exists",
            patient.chart_number
        ))),
        Err(e) => Err(e.into()),
    }
}

#[derive(Serialize)]
pub struct PatientsResponse {
    pub patients: Vec<Patient>,
}

/// `GET /api/patients` — full listing for the table view.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<PatientsResponse>, ApiError> {
    session.require_clinical()?;

    let conn = ctx.state.open_db()?;
    let patients = db::list_patients(&conn)?;
    Ok(Json(PatientsResponse { patients }))
}

/// `GET /api/patients/:chart` — one patient's folder header.
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Path(chart_number): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    session.require_clinical()?;

    let conn = ctx.state.open_db()?;
    let patient = db::get_patient_by_chart(&conn, &chart_number)?
        .ok_or_else(|| ApiError::NotFound(format!("patient {chart_number} not found")))?;
    Ok(Json(patient))
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

/// `DELETE /api/patients/:chart` — remove a chart and, via the cascade,
/// every clinical record hanging off it.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Path(chart_number): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    session.require_clinical()?;

    let conn = ctx.state.open_db()?;
    db::delete_patient_by_chart(&conn, &chart_number)?;
    tracing::info!(chart_number, deleted_by = %session.username, "chart deleted");
    Ok(Json(DeletedResponse { deleted: true }))
}
