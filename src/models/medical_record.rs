use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{RecordSeverity, RecordStatus};

/// One clinical visit for a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub visit_date: NaiveDate,
    pub condition_name: String,
    pub diagnosis: Option<String>,
    pub symptoms: Vec<String>,
    pub treatment: Option<String>,
    pub medications: Vec<String>,
    pub notes: Option<String>,
    pub status: RecordStatus,
    pub severity: RecordSeverity,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
