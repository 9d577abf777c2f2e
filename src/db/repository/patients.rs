use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::Eligibility;
use crate::models::Patient;

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, chart_number, dob, date_of_referral,
         community_of_residence, status, referred_by, reason_for_referral,
         successful_first_contact, eligible_to_midwifery_care,
         reason_for_non_eligibility, weeks_at_first_appointment,
         reason_if_never_seen, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            patient.id.to_string(),
            patient.chart_number,
            patient.dob.map(|d| d.to_string()),
            patient.date_of_referral.map(|d| d.to_string()),
            patient.community_of_residence,
            patient.status,
            patient.referred_by,
            patient.reason_for_referral,
            patient.successful_first_contact as i32,
            patient.eligible_to_midwifery_care.as_str(),
            patient.reason_for_non_eligibility,
            patient.weeks_at_first_appointment,
            patient.reason_if_never_seen,
            patient.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_patient_by_chart(
    conn: &Connection,
    chart_number: &str,
) -> Result<Option<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, chart_number, dob, date_of_referral, community_of_residence,
         status, referred_by, reason_for_referral, successful_first_contact,
         eligible_to_midwifery_care, reason_for_non_eligibility,
         weeks_at_first_appointment, reason_if_never_seen, created_at
         FROM patients WHERE chart_number = ?1",
    )?;

    let result = stmt.query_row(params![chart_number], map_patient_row);

    match result {
        Ok(row) => Ok(Some(patient_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, chart_number, dob, date_of_referral, community_of_residence,
         status, referred_by, reason_for_referral, successful_first_contact,
         eligible_to_midwifery_care, reason_for_non_eligibility,
         weeks_at_first_appointment, reason_if_never_seen, created_at
         FROM patients ORDER BY chart_number ASC",
    )?;

    let rows = stmt.query_map([], map_patient_row)?;

    let mut patients = Vec::new();
    for row in rows {
        patients.push(patient_from_row(row?)?);
    }
    Ok(patients)
}

pub fn delete_patient_by_chart(
    conn: &Connection,
    chart_number: &str,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM patients WHERE chart_number = ?1",
        params![chart_number],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "patient".into(),
            key: chart_number.into(),
        });
    }
    Ok(())
}

pub fn count_patients(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
    Ok(count)
}

struct PatientRow {
    id: String,
    chart_number: String,
    dob: Option<String>,
    date_of_referral: Option<String>,
    community_of_residence: Option<String>,
    status: Option<String>,
    referred_by: Option<String>,
    reason_for_referral: Option<String>,
    successful_first_contact: i32,
    eligible_to_midwifery_care: String,
    reason_for_non_eligibility: Option<String>,
    weeks_at_first_appointment: Option<f64>,
    reason_if_never_seen: Option<String>,
    created_at: String,
}

fn map_patient_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PatientRow> {
    Ok(PatientRow {
        id: row.get(0)?,
        chart_number: row.get(1)?,
        dob: row.get(2)?,
        date_of_referral: row.get(3)?,
        community_of_residence: row.get(4)?,
        status: row.get(5)?,
        referred_by: row.get(6)?,
        reason_for_referral: row.get(7)?,
        successful_first_contact: row.get(8)?,
        eligible_to_midwifery_care: row.get(9)?,
        reason_for_non_eligibility: row.get(10)?,
        weeks_at_first_appointment: row.get(11)?,
        reason_if_never_seen: row.get(12)?,
        created_at: row.get(13)?,
    })
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    Ok(Patient {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        chart_number: row.chart_number,
        dob: row.dob.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        date_of_referral: row
            .date_of_referral
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        community_of_residence: row.community_of_residence,
        status: row.status,
        referred_by: row.referred_by,
        reason_for_referral: row.reason_for_referral,
        successful_first_contact: row.successful_first_contact != 0,
        eligible_to_midwifery_care: Eligibility::from_str(&row.eligible_to_midwifery_care)?,
        reason_for_non_eligibility: row.reason_for_non_eligibility,
        weeks_at_first_appointment: row.weeks_at_first_appointment,
        reason_if_never_seen: row.reason_if_never_seen,
        created_at: NaiveDateTime::parse_from_str(&row.created_at, "%Y-%m-%d %H:%M:%S")
            .unwrap_or_default(),
    })
}
