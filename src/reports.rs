//! Report tables.
//!
//! A report starts from the static dataset menu, reads the whole table,
//! and renders every value to text. The resulting `Table` is what the
//! CSV/PDF/workbook exporters and the statistics panel consume.

use rusqlite::types::Value;
use rusqlite::Connection;
use serde::Serialize;

use crate::db::DatabaseError;
use crate::models::enums::Dataset;

/// A fully rendered report: column names plus stringified rows.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Column list per dataset. Spelled out rather than `SELECT *` so export
/// column order is stable across schema migrations, and so the users
/// export never includes the password hash.
fn dataset_query(dataset: Dataset) -> &'static str {
    match dataset {
        Dataset::Patients => {
            "SELECT chart_number, dob, date_of_referral, community_of_residence,
             status, referred_by, reason_for_referral, successful_first_contact,
             eligible_to_midwifery_care, reason_for_non_eligibility,
             weeks_at_first_appointment, reason_if_never_seen, created_at
             FROM patients ORDER BY chart_number"
        }
        Dataset::PrenatalRecords => {
            "SELECT chart_number, date_collection, gpa, edd_date, tobacco_use,
             substance_use, bmi, ce_cle_status, racism, domestic_violence, housing,
             pregnancy_loss, previous_c_section, previous_vbac, high_risk_pe, gdm,
             anemia, stbbis, trainee_involved, referral_worker,
             prenatal_consultation, notes, telehealth, shared_care, transfer_care,
             transfer_to, care_ended
             FROM prenatal_records ORDER BY chart_number, date_collection"
        }
        Dataset::Appointments => {
            "SELECT chart_number, date, time, appointment_type, detail,
             duration_minutes, attended, notes, created_at
             FROM appointments ORDER BY date, time"
        }
        Dataset::BirthRecords => {
            "SELECT chart_number, birth_date, delivery_mode, place_of_birth,
             birth_weight_grams, apgar_1min, apgar_5min, perineum_state, notes
             FROM birth_records ORDER BY birth_date"
        }
        Dataset::PostpartumRecords => {
            "SELECT chart_number, visit_date, breastfeeding, psychological_state, notes
             FROM postpartum_records ORDER BY visit_date"
        }
        Dataset::Vaccinations => {
            "SELECT chart_number, date, vaccine_type, booster_due, observations
             FROM vaccinations ORDER BY date"
        }
        Dataset::Users => {
            "SELECT username, role, email, created_at FROM users ORDER BY username"
        }
    }
}

/// Read a dataset into a rendered table.
pub fn fetch_table(conn: &Connection, dataset: Dataset) -> Result<Table, DatabaseError> {
    let mut stmt = conn.prepare(dataset_query(dataset))?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let width = columns.len();

    let mut rows = Vec::new();
    let mut raw = stmt.query([])?;
    while let Some(row) = raw.next()? {
        let mut rendered = Vec::with_capacity(width);
        for i in 0..width {
            rendered.push(render_value(row.get::<_, Value>(i)?));
        }
        rows.push(rendered);
    }

    Ok(Table {
        title: dataset.title().to_string(),
        columns,
        rows,
    })
}

fn render_value(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s,
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}
