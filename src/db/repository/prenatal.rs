use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::PrenatalRecord;

const PRENATAL_COLUMNS: &str = "id, chart_number, date_collection, gpa, edd_date,
    tobacco_use, substance_use, bmi, ce_cle_status, racism, domestic_violence,
    housing, pregnancy_loss, previous_c_section, previous_vbac, high_risk_pe,
    gdm, anemia, stbbis, trainee_involved, referral_worker, prenatal_consultation,
    reason1, made_with1, reason2, made_with2, reason3, made_with3, notes,
    telehealth, shared_care, transfer_care, other_transfer_reason, transfer_to,
    care_ended";

pub fn insert_prenatal_record(
    conn: &Connection,
    record: &PrenatalRecord,
) -> Result<(), DatabaseError> {
    let sql = format!(
        "INSERT INTO prenatal_records ({PRENATAL_COLUMNS})
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                 ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28,
                 ?29, ?30, ?31, ?32, ?33, ?34, ?35)"
    );
    conn.execute(
        &sql,
        params![
            record.id.to_string(),
            record.chart_number,
            record.date_collection.to_string(),
            record.gpa,
            record.edd_date.map(|d| d.to_string()),
            record.tobacco_use,
            record.substance_use,
            record.bmi,
            record.ce_cle_status,
            record.racism,
            record.domestic_violence,
            record.housing,
            record.pregnancy_loss,
            record.previous_c_section,
            record.previous_vbac,
            record.high_risk_pe,
            record.gdm,
            record.anemia,
            record.stbbis,
            record.trainee_involved,
            record.referral_worker,
            record.prenatal_consultation,
            record.reason1,
            record.made_with1,
            record.reason2,
            record.made_with2,
            record.reason3,
            record.made_with3,
            record.notes,
            record.telehealth,
            record.shared_care,
            record.transfer_care,
            record.other_transfer_reason,
            record.transfer_to,
            record.care_ended,
        ],
    )?;
    Ok(())
}

/// All collections for a chart, newest first.
pub fn list_prenatal_by_chart(
    conn: &Connection,
    chart_number: &str,
) -> Result<Vec<PrenatalRecord>, DatabaseError> {
    let sql = format!(
        "SELECT {PRENATAL_COLUMNS} FROM prenatal_records
         WHERE chart_number = ?1 ORDER BY date_collection DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![chart_number], map_prenatal_row)?;

    let mut records = Vec::new();
    for row in rows {
        records.push(prenatal_from_row(row?)?);
    }
    Ok(records)
}

/// The most recent collection for a chart, if any.
pub fn latest_prenatal_for_chart(
    conn: &Connection,
    chart_number: &str,
) -> Result<Option<PrenatalRecord>, DatabaseError> {
    Ok(list_prenatal_by_chart(conn, chart_number)?.into_iter().next())
}

struct PrenatalRow {
    id: String,
    chart_number: String,
    date_collection: String,
    gpa: Option<String>,
    edd_date: Option<String>,
    tobacco_use: Option<String>,
    substance_use: Option<String>,
    bmi: Option<f64>,
    ce_cle_status: Option<String>,
    racism: Option<String>,
    domestic_violence: Option<String>,
    housing: Option<String>,
    pregnancy_loss: Option<String>,
    previous_c_section: Option<String>,
    previous_vbac: Option<String>,
    high_risk_pe: Option<String>,
    gdm: Option<String>,
    anemia: Option<String>,
    stbbis: Option<String>,
    trainee_involved: Option<String>,
    referral_worker: Option<String>,
    prenatal_consultation: Option<String>,
    reason1: Option<String>,
    made_with1: Option<String>,
    reason2: Option<String>,
    made_with2: Option<String>,
    reason3: Option<String>,
    made_with3: Option<String>,
    notes: Option<String>,
    telehealth: Option<String>,
    shared_care: Option<String>,
    transfer_care: Option<String>,
    other_transfer_reason: Option<String>,
    transfer_to: Option<String>,
    care_ended: Option<String>,
}

fn map_prenatal_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PrenatalRow> {
    Ok(PrenatalRow {
        id: row.get(0)?,
        chart_number: row.get(1)?,
        date_collection: row.get(2)?,
        gpa: row.get(3)?,
        edd_date: row.get(4)?,
        tobacco_use: row.get(5)?,
        substance_use: row.get(6)?,
        bmi: row.get(7)?,
        ce_cle_status: row.get(8)?,
        racism: row.get(9)?,
        domestic_violence: row.get(10)?,
        housing: row.get(11)?,
        pregnancy_loss: row.get(12)?,
        previous_c_section: row.get(13)?,
        previous_vbac: row.get(14)?,
        high_risk_pe: row.get(15)?,
        gdm: row.get(16)?,
        anemia: row.get(17)?,
        stbbis: row.get(18)?,
        trainee_involved: row.get(19)?,
        referral_worker: row.get(20)?,
        prenatal_consultation: row.get(21)?,
        reason1: row.get(22)?,
        made_with1: row.get(23)?,
        reason2: row.get(24)?,
        made_with2: row.get(25)?,
        reason3: row.get(26)?,
        made_with3: row.get(27)?,
        notes: row.get(28)?,
        telehealth: row.get(29)?,
        shared_care: row.get(30)?,
        transfer_care: row.get(31)?,
        other_transfer_reason: row.get(32)?,
        transfer_to: row.get(33)?,
        care_ended: row.get(34)?,
    })
}

fn prenatal_from_row(row: PrenatalRow) -> Result<PrenatalRecord, DatabaseError> {
    Ok(PrenatalRecord {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        chart_number: row.chart_number,
        date_collection: NaiveDate::parse_from_str(&row.date_collection, "%Y-%m-%d")
            .unwrap_or_default(),
        gpa: row.gpa,
        edd_date: row.edd_date.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        tobacco_use: row.tobacco_use,
        substance_use: row.substance_use,
        bmi: row.bmi,
        ce_cle_status: row.ce_cle_status,
        racism: row.racism,
        domestic_violence: row.domestic_violence,
        housing: row.housing,
        pregnancy_loss: row.pregnancy_loss,
        previous_c_section: row.previous_c_section,
        previous_vbac: row.previous_vbac,
        high_risk_pe: row.high_risk_pe,
        gdm: row.gdm,
        anemia: row.anemia,
        stbbis: row.stbbis,
        trainee_involved: row.trainee_involved,
        referral_worker: row.referral_worker,
        prenatal_consultation: row.prenatal_consultation,
        reason1: row.reason1,
        made_with1: row.made_with1,
        reason2: row.reason2,
        made_with2: row.made_with2,
        reason3: row.reason3,
        made_with3: row.made_with3,
        notes: row.notes,
        telehealth: row.telehealth,
        shared_care: row.shared_care,
        transfer_care: row.transfer_care,
        other_transfer_reason: row.other_transfer_reason,
        transfer_to: row.transfer_to,
        care_ended: row.care_ended,
    })
}
