//! Report and export endpoints.

use std::str::FromStr;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};
use crate::export;
use crate::models::enums::{Dataset, Role};
use crate::reports;
use crate::stats::{self, ColumnSummary};

const REPORT_ROLES: &[Role] = &[Role::Admin, Role::Doctor, Role::Midwife];

fn parse_dataset(name: &str) -> Result<Dataset, ApiError> {
    Dataset::from_str(name)
        .map_err(|_| ApiError::BadRequest(format!("Unknown dataset: {name}")))
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub dataset: Dataset,
    pub title: String,
    pub row_count: usize,
    pub columns: Vec<ColumnSummary>,
}

/// `GET /api/reports/:dataset/summary` — the descriptive-statistics
/// panel for one dataset.
pub async fn summary(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Path(dataset): Path<String>,
) -> Result<Json<SummaryResponse>, ApiError> {
    session.require_role(REPORT_ROLES)?;
    let dataset = parse_dataset(&dataset)?;

    let conn = ctx.state.open_db()?;
    let table = reports::fetch_table(&conn, dataset)?;
    let columns = stats::summarize(&table);

    Ok(Json(SummaryResponse {
        dataset,
        title: table.title.clone(),
        row_count: table.row_count(),
        columns,
    }))
}

/// `GET /api/reports/:dataset/csv` — one dataset as a CSV download.
pub async fn csv(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Path(dataset): Path<String>,
) -> Result<Response, ApiError> {
    session.require_role(REPORT_ROLES)?;
    let dataset = parse_dataset(&dataset)?;

    let conn = ctx.state.open_db()?;
    let table = reports::fetch_table(&conn, dataset)?;
    let bytes = export::table_to_csv(&table)?;

    Ok(download(bytes, "text/csv", &format!("{}.csv", dataset.as_str())))
}

/// `GET /api/reports/:dataset/pdf` — one dataset as a paginated PDF.
pub async fn pdf(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Path(dataset): Path<String>,
) -> Result<Response, ApiError> {
    session.require_role(REPORT_ROLES)?;
    let dataset = parse_dataset(&dataset)?;

    let conn = ctx.state.open_db()?;
    let table = reports::fetch_table(&conn, dataset)?;
    let bytes = export::table_to_pdf(&table)?;

    Ok(download(
        bytes,
        "application/pdf",
        &format!("{}.pdf", dataset.as_str()),
    ))
}

/// `GET /api/reports/workbook` — every dataset, one CSV sheet each,
/// bundled into a gzipped tar archive.
pub async fn workbook(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Response, ApiError> {
    session.require_role(REPORT_ROLES)?;

    let conn = ctx.state.open_db()?;
    let mut tables = Vec::new();
    for dataset in Dataset::all() {
        tables.push(reports::fetch_table(&conn, *dataset)?);
    }
    let bytes = export::tables_to_workbook(&tables)?;

    Ok(download(bytes, "application/gzip", "matrona_export.tar.gz"))
}

fn download(bytes: Vec<u8>, content_type: &str, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}
