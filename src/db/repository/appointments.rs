use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::{AppointmentType, AttendanceStatus};
use crate::models::Appointment;

const APPOINTMENT_COLUMNS: &str = "id, chart_number, date, time, appointment_type,
    detail, duration_minutes, attended, notes, created_by, created_at,
    modified_at, modified_by";

pub fn insert_appointment(
    conn: &Connection,
    appointment: &Appointment,
) -> Result<(), DatabaseError> {
    let sql = format!(
        "INSERT INTO appointments ({APPOINTMENT_COLUMNS})
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
    );
    conn.execute(
        &sql,
        params![
            appointment.id.to_string(),
            appointment.chart_number,
            appointment.date.to_string(),
            appointment.time.format("%H:%M").to_string(),
            appointment.appointment_type.as_str(),
            appointment.detail,
            appointment.duration_minutes,
            appointment.attended.as_str(),
            appointment.notes,
            appointment.created_by.map(|id| id.to_string()),
            appointment.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            appointment
                .modified_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
            appointment.modified_by.map(|id| id.to_string()),
        ],
    )?;
    Ok(())
}

pub fn get_appointment(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Appointment>, DatabaseError> {
    let sql = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let result = stmt.query_row(params![id.to_string()], map_appointment_row);

    match result {
        Ok(row) => Ok(Some(appointment_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Search appointments, optionally narrowed by chart substring and/or date.
/// Results are ordered by date then time, soonest first.
pub fn search_appointments(
    conn: &Connection,
    chart_contains: Option<&str>,
    on_date: Option<NaiveDate>,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut sql = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE 1=1");
    let mut bindings: Vec<String> = Vec::new();

    if let Some(fragment) = chart_contains {
        sql.push_str(" AND chart_number LIKE ?");
        bindings.push(format!("%{fragment}%"));
    }
    if let Some(date) = on_date {
        sql.push_str(" AND date = ?");
        bindings.push(date.to_string());
    }
    sql.push_str(" ORDER BY date ASC, time ASC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(bindings.iter()), map_appointment_row)?;

    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(appointment_from_row(row?)?);
    }
    Ok(appointments)
}

/// Today's reminder list.
pub fn appointments_on(
    conn: &Connection,
    date: NaiveDate,
) -> Result<Vec<Appointment>, DatabaseError> {
    search_appointments(conn, None, Some(date))
}

/// Update the free-text notes on an appointment, stamping who changed it
/// and when.
pub fn update_appointment_notes(
    conn: &Connection,
    id: &Uuid,
    notes: &str,
    modified_by: &Uuid,
    modified_at: NaiveDateTime,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET notes = ?2, modified_at = ?3, modified_by = ?4
         WHERE id = ?1",
        params![
            id.to_string(),
            notes,
            modified_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            modified_by.to_string(),
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "appointment".into(),
            key: id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_appointment(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM appointments WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "appointment".into(),
            key: id.to_string(),
        });
    }
    Ok(())
}

struct AppointmentRow {
    id: String,
    chart_number: String,
    date: String,
    time: String,
    appointment_type: String,
    detail: Option<String>,
    duration_minutes: Option<i64>,
    attended: String,
    notes: Option<String>,
    created_by: Option<String>,
    created_at: String,
    modified_at: Option<String>,
    modified_by: Option<String>,
}

fn map_appointment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AppointmentRow> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        chart_number: row.get(1)?,
        date: row.get(2)?,
        time: row.get(3)?,
        appointment_type: row.get(4)?,
        detail: row.get(5)?,
        duration_minutes: row.get(6)?,
        attended: row.get(7)?,
        notes: row.get(8)?,
        created_by: row.get(9)?,
        created_at: row.get(10)?,
        modified_at: row.get(11)?,
        modified_by: row.get(12)?,
    })
}

fn appointment_from_row(row: AppointmentRow) -> Result<Appointment, DatabaseError> {
    Ok(Appointment {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        chart_number: row.chart_number,
        date: NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").unwrap_or_default(),
        time: NaiveTime::parse_from_str(&row.time, "%H:%M").unwrap_or_default(),
        appointment_type: AppointmentType::from_str(&row.appointment_type)?,
        detail: row.detail,
        duration_minutes: row.duration_minutes,
        attended: AttendanceStatus::from_str(&row.attended)?,
        notes: row.notes,
        created_by: row.created_by.and_then(|s| Uuid::parse_str(&s).ok()),
        created_at: NaiveDateTime::parse_from_str(&row.created_at, "%Y-%m-%d %H:%M:%S")
            .unwrap_or_default(),
        modified_at: row
            .modified_at
            .and_then(|t| NaiveDateTime::parse_from_str(&t, "%Y-%m-%d %H:%M:%S").ok()),
        modified_by: row.modified_by.and_then(|s| Uuid::parse_str(&s).ok()),
    })
}
