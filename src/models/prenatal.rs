use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One prenatal-care data collection for a chart. Flat by design: the
/// collection sheet this mirrors is a single page of checkboxes and
/// short answers, most of them optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrenatalRecord {
    #[serde(default)]
    pub id: Uuid,
    pub chart_number: String,
    pub date_collection: NaiveDate,
    /// Gravida/para/abortus shorthand, e.g. "G2P1A0".
    pub gpa: Option<String>,
    pub edd_date: Option<NaiveDate>,
    pub tobacco_use: Option<String>,
    pub substance_use: Option<String>,
    pub bmi: Option<f64>,
    pub ce_cle_status: Option<String>,
    pub racism: Option<String>,
    pub domestic_violence: Option<String>,
    pub housing: Option<String>,
    pub pregnancy_loss: Option<String>,
    pub previous_c_section: Option<String>,
    pub previous_vbac: Option<String>,
    pub high_risk_pe: Option<String>,
    pub gdm: Option<String>,
    pub anemia: Option<String>,
    pub stbbis: Option<String>,
    pub trainee_involved: Option<String>,
    pub referral_worker: Option<String>,
    pub prenatal_consultation: Option<String>,
    pub reason1: Option<String>,
    pub made_with1: Option<String>,
    pub reason2: Option<String>,
    pub made_with2: Option<String>,
    pub reason3: Option<String>,
    pub made_with3: Option<String>,
    pub notes: Option<String>,
    pub telehealth: Option<String>,
    pub shared_care: Option<String>,
    pub transfer_care: Option<String>,
    pub other_transfer_reason: Option<String>,
    pub transfer_to: Option<String>,
    pub care_ended: Option<String>,
}
