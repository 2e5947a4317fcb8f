use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::AppointmentStatus;

pub const DEFAULT_DURATION_MINUTES: u32 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    /// `None` once the patient has been deleted.
    pub patient_id: Option<Uuid>,
    pub appointment_date: NaiveDate,
    pub appointment_time: Option<NaiveTime>,
    pub duration_minutes: u32,
    pub purpose: String,
    pub doctor_name: Option<String>,
    pub department: Option<String>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
