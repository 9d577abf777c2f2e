use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{AppointmentType, AttendanceStatus};

/// A scheduled visit. `created_by`/`modified_by` reference staff accounts;
/// `modified_*` stay empty until the first edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub chart_number: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub appointment_type: AppointmentType,
    pub detail: Option<String>,
    pub duration_minutes: Option<i64>,
    pub attended: AttendanceStatus,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: NaiveDateTime,
    pub modified_at: Option<NaiveDateTime>,
    pub modified_by: Option<Uuid>,
}
