//! Intake-wizard endpoints.
//!
//! All state lives in the caller's session; these endpoints move the
//! step pointer and read/write the per-step drafts.

use std::str::FromStr;

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};
use crate::wizard::IntakeStep;

#[derive(Serialize)]
pub struct WizardStateResponse {
    pub step: IntakeStep,
    pub title: &'static str,
    pub position: usize,
    pub total: usize,
    pub is_first: bool,
    pub is_last: bool,
    pub has_draft: bool,
}

/// Run a closure against the caller's wizard and report the state it
/// lands in. Everything here holds the session lock for the duration of
/// the mutation only — no database involved.
fn with_wizard<F>(
    ctx: &ApiContext,
    session: &SessionContext,
    mutate: F,
) -> Result<WizardStateResponse, ApiError>
where
    F: FnOnce(&mut crate::wizard::IntakeWizard),
{
    let mut sessions = ctx.state.sessions()?;
    let live = sessions
        .validate(&session.token)
        .ok_or(ApiError::Unauthorized)?;

    mutate(&mut live.wizard);

    let step = live.wizard.current();
    let (position, total) = live.wizard.position();
    Ok(WizardStateResponse {
        step,
        title: step.title(),
        position,
        total,
        is_first: live.wizard.is_first(),
        is_last: live.wizard.is_last(),
        has_draft: live.wizard.draft(step).is_some(),
    })
}

/// `GET /api/wizard` — where am I?
pub async fn current(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<WizardStateResponse>, ApiError> {
    session.require_clinical()?;
    Ok(Json(with_wizard(&ctx, &session, |_| {})?))
}

/// `POST /api/wizard/next` — clamped at the last step.
pub async fn next(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<WizardStateResponse>, ApiError> {
    session.require_clinical()?;
    Ok(Json(with_wizard(&ctx, &session, |wizard| {
        wizard.next();
    })?))
}

/// `POST /api/wizard/prev` — clamped at the first step.
pub async fn prev(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<WizardStateResponse>, ApiError> {
    session.require_clinical()?;
    Ok(Json(with_wizard(&ctx, &session, |wizard| {
        wizard.prev();
    })?))
}

#[derive(Deserialize)]
pub struct GotoRequest {
    pub step: String,
}

/// `POST /api/wizard/goto` — jump straight to a named section.
pub async fn goto(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Json(req): Json<GotoRequest>,
) -> Result<Json<WizardStateResponse>, ApiError> {
    session.require_clinical()?;
    let step = IntakeStep::from_str(&req.step)?;
    Ok(Json(with_wizard(&ctx, &session, |wizard| {
        wizard.goto(step);
    })?))
}

/// `POST /api/wizard/reset` — clear every draft and rewind.
pub async fn reset(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<WizardStateResponse>, ApiError> {
    session.require_clinical()?;
    Ok(Json(with_wizard(&ctx, &session, |wizard| {
        wizard.reset();
    })?))
}

#[derive(Deserialize)]
pub struct DraftRequest {
    pub data: Value,
}

/// `PUT /api/wizard/draft` — save the current step's half-filled form.
pub async fn save_draft(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Json(req): Json<DraftRequest>,
) -> Result<Json<WizardStateResponse>, ApiError> {
    session.require_clinical()?;
    Ok(Json(with_wizard(&ctx, &session, |wizard| {
        wizard.save_draft(req.data);
    })?))
}

#[derive(Serialize)]
pub struct DraftResponse {
    pub step: IntakeStep,
    pub data: Option<Value>,
}

/// `GET /api/wizard/draft` — reload the current step's draft, if any.
pub async fn load_draft(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<DraftResponse>, ApiError> {
    session.require_clinical()?;

    let mut sessions = ctx.state.sessions()?;
    let live = sessions
        .validate(&session.token)
        .ok_or(ApiError::Unauthorized)?;

    let step = live.wizard.current();
    Ok(Json(DraftResponse {
        step,
        data: live.wizard.draft(step).cloned(),
    }))
}
