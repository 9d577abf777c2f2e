use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{DirectMessage, MessageStats, Notification};

// ═══════════════════════════════════════════
// Direct messages
// ═══════════════════════════════════════════

pub fn insert_message(conn: &Connection, msg: &DirectMessage) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO direct_messages (id, sender, recipient, body, sent_at, seen,
         thread_id, attachment_name, attachment_data)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            msg.id.to_string(),
            msg.sender,
            msg.recipient,
            msg.body,
            msg.sent_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            msg.seen as i32,
            msg.thread_id.map(|id| id.to_string()),
            msg.attachment_name,
            msg.attachment_data,
        ],
    )?;
    Ok(())
}

/// Inbox for a recipient, newest first, optionally narrowed by sender
/// and/or the calendar date a message was sent.
pub fn inbox(
    conn: &Connection,
    recipient: &str,
    from_sender: Option<&str>,
    on_date: Option<NaiveDate>,
) -> Result<Vec<DirectMessage>, DatabaseError> {
    let mut sql = String::from(
        "SELECT id, sender, recipient, body, sent_at, seen, thread_id,
         attachment_name, attachment_data
         FROM direct_messages WHERE recipient = ?",
    );
    let mut bindings: Vec<String> = vec![recipient.to_string()];

    if let Some(sender) = from_sender {
        sql.push_str(" AND sender = ?");
        bindings.push(sender.to_string());
    }
    if let Some(date) = on_date {
        sql.push_str(" AND substr(sent_at, 1, 10) = ?");
        bindings.push(date.to_string());
    }
    sql.push_str(" ORDER BY sent_at DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(bindings.iter()), map_message_row)?;

    let mut messages = Vec::new();
    for row in rows {
        messages.push(message_from_row(row?)?);
    }
    Ok(messages)
}

/// Everything in one conversation, oldest first. The thread root is the
/// message whose own id equals `thread_id`.
pub fn thread_messages(
    conn: &Connection,
    thread_id: &Uuid,
) -> Result<Vec<DirectMessage>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, sender, recipient, body, sent_at, seen, thread_id,
         attachment_name, attachment_data
         FROM direct_messages WHERE id = ?1 OR thread_id = ?1
         ORDER BY sent_at ASC",
    )?;
    let rows = stmt.query_map(params![thread_id.to_string()], map_message_row)?;

    let mut messages = Vec::new();
    for row in rows {
        messages.push(message_from_row(row?)?);
    }
    Ok(messages)
}

pub fn unseen_count(conn: &Connection, recipient: &str) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM direct_messages WHERE recipient = ?1 AND seen = 0",
        params![recipient],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn mark_messages_seen(conn: &Connection, recipient: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE direct_messages SET seen = 1 WHERE recipient = ?1",
        params![recipient],
    )?;
    Ok(())
}

/// Aggregate counters for the messaging dashboard. `by_role` joins the
/// sender back to the accounts table; messages from deleted accounts are
/// counted under "unknown".
pub fn message_stats(conn: &Connection) -> Result<MessageStats, DatabaseError> {
    let total = conn.query_row("SELECT COUNT(*) FROM direct_messages", [], |r| r.get(0))?;
    let threads = conn.query_row(
        "SELECT COUNT(DISTINCT COALESCE(thread_id, id)) FROM direct_messages",
        [],
        |r| r.get(0),
    )?;
    let attachments = conn.query_row(
        "SELECT COUNT(*) FROM direct_messages WHERE attachment_name IS NOT NULL",
        [],
        |r| r.get(0),
    )?;

    let mut stmt = conn.prepare(
        "SELECT COALESCE(users.role, 'unknown'), COUNT(*)
         FROM direct_messages
         LEFT JOIN users ON direct_messages.sender = users.username
         GROUP BY COALESCE(users.role, 'unknown')
         ORDER BY 1",
    )?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
    let by_role = rows.collect::<Result<Vec<_>, _>>()?;

    Ok(MessageStats {
        total,
        threads,
        attachments,
        by_role,
    })
}

struct MessageRow {
    id: String,
    sender: String,
    recipient: String,
    body: String,
    sent_at: String,
    seen: i32,
    thread_id: Option<String>,
    attachment_name: Option<String>,
    attachment_data: Option<Vec<u8>>,
}

fn map_message_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        sender: row.get(1)?,
        recipient: row.get(2)?,
        body: row.get(3)?,
        sent_at: row.get(4)?,
        seen: row.get(5)?,
        thread_id: row.get(6)?,
        attachment_name: row.get(7)?,
        attachment_data: row.get(8)?,
    })
}

fn message_from_row(row: MessageRow) -> Result<DirectMessage, DatabaseError> {
    Ok(DirectMessage {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        sender: row.sender,
        recipient: row.recipient,
        body: row.body,
        sent_at: NaiveDateTime::parse_from_str(&row.sent_at, "%Y-%m-%d %H:%M:%S")
            .unwrap_or_default(),
        seen: row.seen != 0,
        thread_id: row.thread_id.and_then(|s| Uuid::parse_str(&s).ok()),
        attachment_name: row.attachment_name,
        attachment_data: row.attachment_data,
    })
}

// ═══════════════════════════════════════════
// Notifications
// ═══════════════════════════════════════════

pub fn insert_notification(
    conn: &Connection,
    notification: &Notification,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO notifications (id, username, body, seen, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            notification.id.to_string(),
            notification.username,
            notification.body,
            notification.seen as i32,
            notification.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

pub fn unseen_notifications(
    conn: &Connection,
    username: &str,
) -> Result<Vec<Notification>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, username, body, seen, created_at
         FROM notifications WHERE username = ?1 AND seen = 0
         ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map(params![username], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, i32>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut notifications = Vec::new();
    for row in rows {
        let (id, username, body, seen, created_at) = row?;
        notifications.push(Notification {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            username,
            body,
            seen: seen != 0,
            created_at: NaiveDateTime::parse_from_str(&created_at, "%Y-%m-%d %H:%M:%S")
                .unwrap_or_default(),
        });
    }
    Ok(notifications)
}

pub fn mark_notifications_seen(conn: &Connection, username: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE notifications SET seen = 1 WHERE username = ?1",
        params![username],
    )?;
    Ok(())
}
