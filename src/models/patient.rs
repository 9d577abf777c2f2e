use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Eligibility;

/// Demographic intake record. Keyed by a surrogate id; `chart_number` is
/// the clinic-assigned identifier and is unique across the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub chart_number: String,
    pub dob: Option<NaiveDate>,
    pub date_of_referral: Option<NaiveDate>,
    pub community_of_residence: Option<String>,
    pub status: Option<String>,
    pub referred_by: Option<String>,
    pub reason_for_referral: Option<String>,
    pub successful_first_contact: bool,
    pub eligible_to_midwifery_care: Eligibility,
    pub reason_for_non_eligibility: Option<String>,
    pub weeks_at_first_appointment: Option<f64>,
    pub reason_if_never_seen: Option<String>,
    pub created_at: NaiveDateTime,
}
