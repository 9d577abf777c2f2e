//! Prenatal-care form endpoints.

use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};
use crate::db;
use crate::models::PrenatalRecord;

/// `POST /api/prenatal` — submit a prenatal-care collection. The body is
/// the record itself minus the id; any id a client sends is replaced.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Json(mut record): Json<PrenatalRecord>,
) -> Result<Json<PrenatalRecord>, ApiError> {
    session.require_clinical()?;

    if record.chart_number.trim().is_empty() {
        return Err(ApiError::BadRequest("Chart number is required".into()));
    }
    record.id = Uuid::new_v4();

    let conn = ctx.state.open_db()?;
    if db::get_patient_by_chart(&conn, &record.chart_number)?.is_none() {
        return Err(ApiError::NotFound(format!(
            "patient {} not found",
            record.chart_number
        )));
    }
    db::insert_prenatal_record(&conn, &record)?;
    Ok(Json(record))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub chart_number: String,
    /// When set, return only the most recent collection.
    #[serde(default)]
    pub latest: bool,
}

#[derive(Serialize)]
pub struct PrenatalResponse {
    pub records: Vec<PrenatalRecord>,
}

/// `GET /api/prenatal?chart_number=…` — a chart's collections, newest
/// first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PrenatalResponse>, ApiError> {
    session.require_clinical()?;

    let conn = ctx.state.open_db()?;
    let records = if query.latest {
        db::latest_prenatal_for_chart(&conn, &query.chart_number)?
            .into_iter()
            .collect()
    } else {
        db::list_prenatal_by_chart(&conn, &query.chart_number)?
    };
    Ok(Json(PrenatalResponse { records }))
}
