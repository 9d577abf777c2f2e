use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{BreastfeedingStatus, DeliveryMode, PsychologicalState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BirthRecord {
    #[serde(default)]
    pub id: Uuid,
    pub chart_number: String,
    pub birth_date: NaiveDate,
    pub delivery_mode: DeliveryMode,
    pub place_of_birth: Option<String>,
    pub birth_weight_grams: Option<f64>,
    pub apgar_1min: Option<i64>,
    pub apgar_5min: Option<i64>,
    pub perineum_state: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostpartumRecord {
    #[serde(default)]
    pub id: Uuid,
    pub chart_number: String,
    pub visit_date: NaiveDate,
    pub breastfeeding: BreastfeedingStatus,
    pub psychological_state: PsychologicalState,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaccinationRecord {
    #[serde(default)]
    pub id: Uuid,
    pub chart_number: String,
    pub date: NaiveDate,
    pub vaccine_type: String,
    pub booster_due: Option<NaiveDate>,
    pub observations: Option<String>,
}
