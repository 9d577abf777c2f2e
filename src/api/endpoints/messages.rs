//! Direct-message and notification endpoints.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use base64::Engine;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};
use crate::db;
use crate::models::{DirectMessage, MessageStats, Notification};

/// Attachments ride inline in the message row; cap them the way the
/// legacy uploader did.
const MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

#[derive(Deserialize)]
pub struct SendRequest {
    pub recipient: String,
    pub body: String,
    /// Set on replies: the id of the first message in the conversation.
    pub thread_id: Option<Uuid>,
    pub attachment_name: Option<String>,
    /// Base64-encoded attachment bytes.
    pub attachment_base64: Option<String>,
}

/// `POST /api/messages` — send a message (or a reply, when `thread_id`
/// is set). The recipient also gets an in-app notification.
pub async fn send(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Json(req): Json<SendRequest>,
) -> Result<Json<DirectMessage>, ApiError> {
    session.require_clinical()?;

    if req.body.trim().is_empty() {
        return Err(ApiError::BadRequest("Message body cannot be empty".into()));
    }
    if req.recipient == session.username {
        return Err(ApiError::BadRequest("Cannot message yourself".into()));
    }

    let attachment_data = match &req.attachment_base64 {
        Some(b64) => {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(b64)
                .map_err(|_| ApiError::BadRequest("Invalid attachment encoding".into()))?;
            if bytes.len() > MAX_ATTACHMENT_BYTES {
                return Err(ApiError::BadRequest("Attachment too large".into()));
            }
            Some(bytes)
        }
        None => None,
    };
    if attachment_data.is_some() && req.attachment_name.is_none() {
        return Err(ApiError::BadRequest("Attachment needs a file name".into()));
    }

    let conn = ctx.state.open_db()?;
    if db::get_user_by_username(&conn, &req.recipient)?.is_none() {
        return Err(ApiError::NotFound(format!(
            "No account with username {}",
            req.recipient
        )));
    }

    let now = chrono::Local::now().naive_local();
    let message = DirectMessage {
        id: Uuid::new_v4(),
        sender: session.username.clone(),
        recipient: req.recipient.clone(),
        body: req.body.trim().to_string(),
        sent_at: now,
        seen: false,
        thread_id: req.thread_id,
        attachment_name: req.attachment_name,
        attachment_data,
    };
    db::insert_message(&conn, &message)?;
    db::insert_notification(
        &conn,
        &Notification {
            id: Uuid::new_v4(),
            username: req.recipient,
            body: format!("New message from {}", session.username),
            seen: false,
            created_at: now,
        },
    )?;

    Ok(Json(message))
}

#[derive(Deserialize)]
pub struct InboxQuery {
    pub sender: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct InboxResponse {
    pub messages: Vec<DirectMessage>,
}

/// `GET /api/messages/inbox` — the reader's inbox, with the sender and
/// date filters from the inbox page.
pub async fn inbox(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<InboxQuery>,
) -> Result<Json<InboxResponse>, ApiError> {
    session.require_clinical()?;

    let conn = ctx.state.open_db()?;
    let messages = db::inbox(
        &conn,
        &session.username,
        query.sender.as_deref(),
        query.date,
    )?;
    Ok(Json(InboxResponse { messages }))
}

/// `GET /api/messages/threads/:id` — one conversation, oldest first.
pub async fn thread(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<InboxResponse>, ApiError> {
    session.require_clinical()?;

    let conn = ctx.state.open_db()?;
    let messages = db::thread_messages(&conn, &id)?;
    if messages.is_empty() {
        return Err(ApiError::NotFound(format!("thread {id} not found")));
    }
    // Only participants may read a conversation
    if !messages
        .iter()
        .any(|m| m.sender == session.username || m.recipient == session.username)
    {
        return Err(ApiError::Forbidden(
            "Access restricted to conversation participants".into(),
        ));
    }
    Ok(Json(InboxResponse { messages }))
}

#[derive(Serialize)]
pub struct UnseenResponse {
    pub count: i64,
}

/// `GET /api/messages/unseen-count` — the badge number.
pub async fn unseen_count(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<UnseenResponse>, ApiError> {
    session.require_clinical()?;

    let conn = ctx.state.open_db()?;
    let count = db::unseen_count(&conn, &session.username)?;
    Ok(Json(UnseenResponse { count }))
}

#[derive(Serialize)]
pub struct MarkedResponse {
    pub marked: bool,
}

/// `POST /api/messages/mark-seen` — opening the inbox clears the badge.
pub async fn mark_seen(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<MarkedResponse>, ApiError> {
    session.require_clinical()?;

    let conn = ctx.state.open_db()?;
    db::mark_messages_seen(&conn, &session.username)?;
    Ok(Json(MarkedResponse { marked: true }))
}

/// `GET /api/messages/stats` — the messaging dashboard counters.
pub async fn stats(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<MessageStats>, ApiError> {
    session.require_clinical()?;

    let conn = ctx.state.open_db()?;
    let stats = db::message_stats(&conn)?;
    Ok(Json(stats))
}

#[derive(Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
}

/// `GET /api/notifications` — unseen notifications for the session user.
pub async fn notifications(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<NotificationsResponse>, ApiError> {
    session.require_clinical()?;

    let conn = ctx.state.open_db()?;
    let notifications = db::unseen_notifications(&conn, &session.username)?;
    Ok(Json(NotificationsResponse { notifications }))
}

/// `POST /api/notifications/mark-seen`
pub async fn notifications_mark_seen(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<MarkedResponse>, ApiError> {
    session.require_clinical()?;

    let conn = ctx.state.open_db()?;
    db::mark_notifications_seen(&conn, &session.username)?;
    Ok(Json(MarkedResponse { marked: true }))
}
