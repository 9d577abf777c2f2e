use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A direct message between two staff accounts. A reply carries the
/// `thread_id` of the first message in its conversation; a first message
/// has none. Attachment bytes are stored inline in the row — the original
/// tool capped uploads at a few megabytes and so do we.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectMessage {
    pub id: Uuid,
    pub sender: String,
    pub recipient: String,
    pub body: String,
    pub sent_at: NaiveDateTime,
    pub seen: bool,
    pub thread_id: Option<Uuid>,
    pub attachment_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_data: Option<Vec<u8>>,
}

/// Aggregate counters shown on the messaging dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageStats {
    pub total: i64,
    pub threads: i64,
    pub attachments: i64,
    /// Message counts keyed by the sender's role.
    pub by_role: Vec<(String, i64)>,
}

/// An in-app notification for one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub username: String,
    pub body: String,
    pub seen: bool,
    pub created_at: NaiveDateTime,
}
