use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::{BreastfeedingStatus, DeliveryMode, PsychologicalState};
use crate::models::{BirthRecord, PostpartumRecord, VaccinationRecord};

// ═══════════════════════════════════════════
// Birth records
// ═══════════════════════════════════════════

pub fn insert_birth_record(conn: &Connection, record: &BirthRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO birth_records (id, chart_number, birth_date, delivery_mode,
         place_of_birth, birth_weight_grams, apgar_1min, apgar_5min,
         perineum_state, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            record.id.to_string(),
            record.chart_number,
            record.birth_date.to_string(),
            record.delivery_mode.as_str(),
            record.place_of_birth,
            record.birth_weight_grams,
            record.apgar_1min,
            record.apgar_5min,
            record.perineum_state,
            record.notes,
        ],
    )?;
    Ok(())
}

pub fn list_birth_records(
    conn: &Connection,
    chart_number: Option<&str>,
) -> Result<Vec<BirthRecord>, DatabaseError> {
    let mut sql = String::from(
        "SELECT id, chart_number, birth_date, delivery_mode, place_of_birth,
         birth_weight_grams, apgar_1min, apgar_5min, perineum_state, notes
         FROM birth_records",
    );
    let mut bindings: Vec<String> = Vec::new();
    if let Some(chart) = chart_number {
        sql.push_str(" WHERE chart_number = ?");
        bindings.push(chart.to_string());
    }
    sql.push_str(" ORDER BY birth_date DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(bindings.iter()), |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, Option<f64>>(5)?,
            row.get::<_, Option<i64>>(6)?,
            row.get::<_, Option<i64>>(7)?,
            row.get::<_, Option<String>>(8)?,
            row.get::<_, Option<String>>(9)?,
        ))
    })?;

    let mut records = Vec::new();
    for row in rows {
        let (id, chart, date, mode, place, weight, apgar1, apgar5, perineum, notes) = row?;
        records.push(BirthRecord {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            chart_number: chart,
            birth_date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").unwrap_or_default(),
            delivery_mode: DeliveryMode::from_str(&mode)?,
            place_of_birth: place,
            birth_weight_grams: weight,
            apgar_1min: apgar1,
            apgar_5min: apgar5,
            perineum_state: perineum,
            notes,
        });
    }
    Ok(records)
}

// ═══════════════════════════════════════════
// Postpartum records
// ═══════════════════════════════════════════

pub fn insert_postpartum_record(
    conn: &Connection,
    record: &PostpartumRecord,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO postpartum_records (id, chart_number, visit_date,
         breastfeeding, psychological_state, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            record.id.to_string(),
            record.chart_number,
            record.visit_date.to_string(),
            record.breastfeeding.as_str(),
            record.psychological_state.as_str(),
            record.notes,
        ],
    )?;
    Ok(())
}

pub fn list_postpartum_records(
    conn: &Connection,
    chart_number: Option<&str>,
) -> Result<Vec<PostpartumRecord>, DatabaseError> {
    let mut sql = String::from(
        "SELECT id, chart_number, visit_date, breastfeeding, psychological_state, notes
         FROM postpartum_records",
    );
    let mut bindings: Vec<String> = Vec::new();
    if let Some(chart) = chart_number {
        sql.push_str(" WHERE chart_number = ?");
        bindings.push(chart.to_string());
    }
    sql.push_str(" ORDER BY visit_date DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(bindings.iter()), |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, Option<String>>(5)?,
        ))
    })?;

    let mut records = Vec::new();
    for row in rows {
        let (id, chart, date, feeding, state, notes) = row?;
        records.push(PostpartumRecord {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            chart_number: chart,
            visit_date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").unwrap_or_default(),
            breastfeeding: BreastfeedingStatus::from_str(&feeding)?,
            psychological_state: PsychologicalState::from_str(&state)?,
            notes,
        });
    }
    Ok(records)
}

// ═══════════════════════════════════════════
// Vaccinations
// ═══════════════════════════════════════════

pub fn insert_vaccination(
    conn: &Connection,
    record: &VaccinationRecord,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO vaccinations (id, chart_number, date, vaccine_type,
         booster_due, observations)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            record.id.to_string(),
            record.chart_number,
            record.date.to_string(),
            record.vaccine_type,
            record.booster_due.map(|d| d.to_string()),
            record.observations,
        ],
    )?;
    Ok(())
}

pub fn list_vaccinations(
    conn: &Connection,
    chart_number: Option<&str>,
) -> Result<Vec<VaccinationRecord>, DatabaseError> {
    let mut sql = String::from(
        "SELECT id, chart_number, date, vaccine_type, booster_due, observations
         FROM vaccinations",
    );
    let mut bindings: Vec<String> = Vec::new();
    if let Some(chart) = chart_number {
        sql.push_str(" WHERE chart_number = ?");
        bindings.push(chart.to_string());
    }
    sql.push_str(" ORDER BY date DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(bindings.iter()), |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, Option<String>>(5)?,
        ))
    })?;

    let mut records = Vec::new();
    for row in rows {
        let (id, chart, date, vaccine, booster, observations) = row?;
        records.push(VaccinationRecord {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            chart_number: chart,
            date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").unwrap_or_default(),
            vaccine_type: vaccine,
            booster_due: booster.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
            observations,
        });
    }
    Ok(records)
}
