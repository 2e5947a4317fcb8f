//! Record store service: patients, appointments and medical records.
//!
//! Form types arrive as loosely-typed strings (from the CLI or a front end),
//! are validated here, and land in the repository as typed models.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{OVERVIEW_RECENT_PATIENTS_LIMIT, OVERVIEW_UPCOMING_LIMIT};
use crate::db::{self, DatabaseError};
use crate::models::appointment::DEFAULT_DURATION_MINUTES;
use crate::models::enums::{AppointmentStatus, Gender, RecordSeverity, RecordStatus};
use crate::models::{Appointment, MedicalRecord, Patient};

pub const UNKNOWN_PATIENT: &str = "Unknown";

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

// ═══════════════════════════════════════════
// Forms
// ═══════════════════════════════════════════

/// New patient. `allergies` and `chronic_conditions` are comma-separated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PatientForm {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub blood_type: Option<String>,
    pub allergies: String,
    pub chronic_conditions: String,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppointmentForm {
    pub patient_id: String,
    pub appointment_date: String,
    /// HH:MM
    pub appointment_time: Option<String>,
    /// Defaults to 30 minutes.
    pub duration_minutes: Option<u32>,
    pub purpose: String,
    pub doctor_name: Option<String>,
    pub department: Option<String>,
    pub notes: Option<String>,
}

/// New visit. `symptoms` and `medications` are comma-separated;
/// status defaults to active and severity to low.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MedicalRecordForm {
    pub patient_id: String,
    pub visit_date: String,
    pub condition_name: String,
    pub diagnosis: Option<String>,
    pub symptoms: String,
    pub treatment: Option<String>,
    pub medications: String,
    pub notes: Option<String>,
    pub status: Option<String>,
    pub severity: Option<String>,
}

// ═══════════════════════════════════════════
// View types
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct UpcomingAppointment {
    pub patient_name: String,
    #[serde(flatten)]
    pub appointment: Appointment,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardOverview {
    pub total_patients: i64,
    pub total_appointments: i64,
    pub total_records: i64,
    pub scheduled_appointments: i64,
    /// Newest patients first.
    pub recent_patients: Vec<Patient>,
    pub upcoming: Vec<UpcomingAppointment>,
}

// ═══════════════════════════════════════════
// Patients
// ═══════════════════════════════════════════

pub fn create_patient(conn: &Connection, form: &PatientForm) -> Result<Patient, RecordError> {
    let first_name = required("First name", &form.first_name)?;
    let last_name = required("Last name", &form.last_name)?;
    let date_of_birth = parse_form_date("date of birth", &form.date_of_birth)?;
    let gender = non_blank(&form.gender)
        .map(|g| {
            Gender::from_str(&g.to_lowercase())
                .map_err(|_| RecordError::Validation(format!("Invalid gender: {g}")))
        })
        .transpose()?;

    let now = now();
    let patient = Patient {
        id: Uuid::new_v4(),
        first_name,
        last_name,
        date_of_birth,
        gender,
        phone: non_blank(&form.phone),
        email: non_blank(&form.email),
        address: non_blank(&form.address),
        blood_type: non_blank(&form.blood_type),
        allergies: split_list(&form.allergies),
        chronic_conditions: split_list(&form.chronic_conditions),
        emergency_contact_name: non_blank(&form.emergency_contact_name),
        emergency_contact_phone: non_blank(&form.emergency_contact_phone),
        created_at: now,
        updated_at: now,
    };
    db::insert_patient(conn, &patient)?;
    tracing::info!(patient_id = %patient.id, "Patient created");
    Ok(patient)
}

pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, RecordError> {
    Ok(db::list_patients(conn)?)
}

/// Case-insensitive match on "first last" or email, newest first.
pub fn search_patients(conn: &Connection, term: &str) -> Result<Vec<Patient>, RecordError> {
    let needle = term.trim().to_lowercase();
    let patients = db::list_patients(conn)?;
    if needle.is_empty() {
        return Ok(patients);
    }
    Ok(patients
        .into_iter()
        .filter(|p| {
            p.display_name().to_lowercase().contains(&needle)
                || p.email
                    .as_deref()
                    .is_some_and(|e| e.to_lowercase().contains(&needle))
        })
        .collect())
}

pub fn delete_patient(conn: &Connection, id: &Uuid) -> Result<(), RecordError> {
    db::delete_patient(conn, id)?;
    tracing::info!(patient_id = %id, "Patient deleted");
    Ok(())
}

// ═══════════════════════════════════════════
// Appointments
// ═══════════════════════════════════════════

pub fn create_appointment(
    conn: &Connection,
    form: &AppointmentForm,
) -> Result<Appointment, RecordError> {
    let patient_id = existing_patient(conn, &form.patient_id)?;
    let appointment_date = parse_form_date("appointment date", &form.appointment_date)?;
    let appointment_time = non_blank(&form.appointment_time)
        .map(|t| {
            NaiveTime::parse_from_str(&t, "%H:%M").map_err(|_| {
                RecordError::Validation(format!("Invalid appointment time (expected HH:MM): {t}"))
            })
        })
        .transpose()?;
    let duration_minutes = form.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
    if duration_minutes == 0 {
        return Err(RecordError::Validation(
            "Duration must be a positive number of minutes".into(),
        ));
    }

    let now = now();
    let appointment = Appointment {
        id: Uuid::new_v4(),
        patient_id: Some(patient_id),
        appointment_date,
        appointment_time,
        duration_minutes,
        purpose: form.purpose.trim().to_string(),
        doctor_name: non_blank(&form.doctor_name),
        department: non_blank(&form.department),
        status: AppointmentStatus::Scheduled,
        notes: non_blank(&form.notes),
        created_at: now,
        updated_at: now,
    };
    db::insert_appointment(conn, &appointment)?;
    tracing::info!(
        appointment_id = %appointment.id,
        patient_id = %patient_id,
        date = %appointment.appointment_date,
        "Appointment scheduled"
    );
    Ok(appointment)
}

pub fn list_appointments(conn: &Connection) -> Result<Vec<Appointment>, RecordError> {
    Ok(db::list_appointments(conn)?)
}

pub fn set_appointment_status(
    conn: &Connection,
    id: &Uuid,
    status: AppointmentStatus,
) -> Result<Appointment, RecordError> {
    db::update_appointment_status(conn, id, status, &now())?;
    tracing::info!(appointment_id = %id, status = status.as_str(), "Appointment status changed");
    db::get_appointment(conn, id)?.ok_or_else(|| {
        RecordError::Database(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        })
    })
}

// ═══════════════════════════════════════════
// Medical records
// ═══════════════════════════════════════════

pub fn create_medical_record(
    conn: &Connection,
    form: &MedicalRecordForm,
) -> Result<MedicalRecord, RecordError> {
    let patient_id = existing_patient(conn, &form.patient_id)?;
    let visit_date = parse_form_date("visit date", &form.visit_date)?;
    let condition_name = required("Condition name", &form.condition_name)?;
    let status = match non_blank(&form.status) {
        Some(s) => RecordStatus::from_str(&s.to_lowercase())
            .map_err(|_| RecordError::Validation(format!("Invalid record status: {s}")))?,
        None => RecordStatus::Active,
    };
    let severity = match non_blank(&form.severity) {
        Some(s) => RecordSeverity::from_str(&s.to_lowercase())
            .map_err(|_| RecordError::Validation(format!("Invalid record severity: {s}")))?,
        None => RecordSeverity::Low,
    };

    let now = now();
    let record = MedicalRecord {
        id: Uuid::new_v4(),
        patient_id,
        visit_date,
        condition_name,
        diagnosis: non_blank(&form.diagnosis),
        symptoms: split_list(&form.symptoms),
        treatment: non_blank(&form.treatment),
        medications: split_list(&form.medications),
        notes: non_blank(&form.notes),
        status,
        severity,
        created_at: now,
        updated_at: now,
    };
    db::insert_medical_record(conn, &record)?;
    tracing::info!(record_id = %record.id, patient_id = %patient_id, "Medical record added");
    Ok(record)
}

pub fn list_medical_records(conn: &Connection) -> Result<Vec<MedicalRecord>, RecordError> {
    Ok(db::list_medical_records(conn)?)
}

/// One patient's visits, most recent first. Unknown patients are an error,
/// not an empty list.
pub fn list_records_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<MedicalRecord>, RecordError> {
    if db::get_patient(conn, patient_id)?.is_none() {
        return Err(RecordError::Database(DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: patient_id.to_string(),
        }));
    }
    Ok(db::list_records_for_patient(conn, patient_id)?)
}

// ═══════════════════════════════════════════
// Overview
// ═══════════════════════════════════════════

pub fn overview(conn: &Connection) -> Result<DashboardOverview, RecordError> {
    let upcoming = db::list_upcoming_appointments(conn, OVERVIEW_UPCOMING_LIMIT)?
        .into_iter()
        .map(|appointment| {
            let patient = match appointment.patient_id {
                Some(id) => db::get_patient(conn, &id)?,
                None => None,
            };
            let patient_name = patient
                .map(|p| p.display_name())
                .unwrap_or_else(|| UNKNOWN_PATIENT.to_string());
            Ok(UpcomingAppointment {
                patient_name,
                appointment,
            })
        })
        .collect::<Result<Vec<_>, DatabaseError>>()?;

    Ok(DashboardOverview {
        total_patients: db::count_patients(conn)?,
        total_appointments: db::count_appointments(conn)?,
        total_records: db::count_medical_records(conn)?,
        scheduled_appointments: db::count_appointments_by_status(
            conn,
            AppointmentStatus::Scheduled,
        )?,
        recent_patients: db::list_recent_patients(conn, OVERVIEW_RECENT_PATIENTS_LIMIT)?,
        upcoming,
    })
}

// ═══════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn required(label: &str, value: &str) -> Result<String, RecordError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RecordError::Validation(format!("{label} is required")));
    }
    Ok(trimmed.to_string())
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Comma-separated input to a list; blanks are dropped.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_form_date(label: &str, raw: &str) -> Result<NaiveDate, RecordError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        RecordError::Validation(format!("Invalid {label} format (expected YYYY-MM-DD)"))
    })
}

fn existing_patient(conn: &Connection, raw: &str) -> Result<Uuid, RecordError> {
    let id = Uuid::parse_str(raw.trim())
        .map_err(|_| RecordError::Validation(format!("Invalid patient id: {raw}")))?;
    if db::get_patient(conn, &id)?.is_none() {
        return Err(RecordError::Validation(format!("Patient {id} does not exist")));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn test_db() -> Connection {
        open_memory_database().expect("Failed to open test database")
    }

    fn patient_form(first: &str, last: &str) -> PatientForm {
        PatientForm {
            first_name: first.into(),
            last_name: last.into(),
            date_of_birth: "1990-04-12".into(),
            ..Default::default()
        }
    }

    fn appointment_form(patient_id: Uuid, date: &str) -> AppointmentForm {
        AppointmentForm {
            patient_id: patient_id.to_string(),
            appointment_date: date.into(),
            purpose: "Follow-up".into(),
            ..Default::default()
        }
    }

    #[test]
    fn create_patient_splits_and_trims_lists() {
        let conn = test_db();
        let form = PatientForm {
            allergies: " Penicillin, , Latex ,".into(),
            chronic_conditions: "Asthma".into(),
            gender: Some("Female".into()),
            email: Some("   ".into()),
            ..patient_form("Marie", "Curie")
        };
        let patient = create_patient(&conn, &form).unwrap();
        assert_eq!(patient.allergies, vec!["Penicillin", "Latex"]);
        assert_eq!(patient.chronic_conditions, vec!["Asthma"]);
        assert_eq!(patient.gender, Some(Gender::Female));
        assert_eq!(patient.email, None);
        assert_eq!(list_patients(&conn).unwrap(), vec![patient]);
    }

    #[test]
    fn create_patient_requires_names_and_date() {
        let conn = test_db();
        let missing_first = patient_form("  ", "Curie");
        assert!(matches!(
            create_patient(&conn, &missing_first),
            Err(RecordError::Validation(msg)) if msg.contains("First name")
        ));

        let bad_date = PatientForm {
            date_of_birth: "12/04/1990".into(),
            ..patient_form("Marie", "Curie")
        };
        assert!(matches!(
            create_patient(&conn, &bad_date),
            Err(RecordError::Validation(_))
        ));
    }

    #[test]
    fn create_patient_rejects_unknown_gender() {
        let conn = test_db();
        let form = PatientForm {
            gender: Some("robot".into()),
            ..patient_form("Marie", "Curie")
        };
        assert!(matches!(
            create_patient(&conn, &form),
            Err(RecordError::Validation(_))
        ));
    }

    #[test]
    fn search_matches_full_name_and_email_case_insensitively() {
        let conn = test_db();
        create_patient(&conn, &patient_form("Ada", "Lovelace")).unwrap();
        let form = PatientForm {
            email: Some("Charles@Engine.org".into()),
            ..patient_form("Charles", "Babbage")
        };
        create_patient(&conn, &form).unwrap();

        let by_name = search_patients(&conn, "ada LOVE").unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].first_name, "Ada");

        let by_email = search_patients(&conn, "engine.ORG").unwrap();
        assert_eq!(by_email.len(), 1);
        assert_eq!(by_email[0].first_name, "Charles");

        assert!(search_patients(&conn, "hopper").unwrap().is_empty());
        assert_eq!(search_patients(&conn, "  ").unwrap().len(), 2);
    }

    #[test]
    fn appointment_defaults_to_scheduled_and_thirty_minutes() {
        let conn = test_db();
        let patient = create_patient(&conn, &patient_form("Ada", "Lovelace")).unwrap();
        let form = AppointmentForm {
            appointment_time: Some("14:45".into()),
            ..appointment_form(patient.id, "2030-01-20")
        };
        let appt = create_appointment(&conn, &form).unwrap();
        assert_eq!(appt.status, AppointmentStatus::Scheduled);
        assert_eq!(appt.duration_minutes, 30);
        assert_eq!(appt.appointment_time, NaiveTime::from_hms_opt(14, 45, 0));
        assert_eq!(appt.patient_id, Some(patient.id));
    }

    #[test]
    fn appointment_requires_existing_patient() {
        let conn = test_db();
        let form = appointment_form(Uuid::new_v4(), "2030-01-20");
        assert!(matches!(
            create_appointment(&conn, &form),
            Err(RecordError::Validation(msg)) if msg.contains("does not exist")
        ));
    }

    #[test]
    fn appointment_rejects_zero_duration_and_bad_time() {
        let conn = test_db();
        let patient = create_patient(&conn, &patient_form("Ada", "Lovelace")).unwrap();

        let zero = AppointmentForm {
            duration_minutes: Some(0),
            ..appointment_form(patient.id, "2030-01-20")
        };
        assert!(matches!(create_appointment(&conn, &zero), Err(RecordError::Validation(_))));

        let bad_time = AppointmentForm {
            appointment_time: Some("quarter past".into()),
            ..appointment_form(patient.id, "2030-01-20")
        };
        assert!(matches!(
            create_appointment(&conn, &bad_time),
            Err(RecordError::Validation(_))
        ));
    }

    #[test]
    fn appointments_list_by_date_ascending() {
        let conn = test_db();
        let patient = create_patient(&conn, &patient_form("Ada", "Lovelace")).unwrap();
        create_appointment(&conn, &appointment_form(patient.id, "2030-03-01")).unwrap();
        create_appointment(&conn, &appointment_form(patient.id, "2030-01-01")).unwrap();

        let dates: Vec<String> = list_appointments(&conn)
            .unwrap()
            .iter()
            .map(|a| a.appointment_date.to_string())
            .collect();
        assert_eq!(dates, vec!["2030-01-01", "2030-03-01"]);
    }

    #[test]
    fn status_change_is_returned_and_missing_is_not_found() {
        let conn = test_db();
        let patient = create_patient(&conn, &patient_form("Ada", "Lovelace")).unwrap();
        let appt = create_appointment(&conn, &appointment_form(patient.id, "2030-01-20")).unwrap();

        let updated = set_appointment_status(&conn, &appt.id, AppointmentStatus::Confirmed).unwrap();
        assert_eq!(updated.status, AppointmentStatus::Confirmed);
        assert!(updated.updated_at >= appt.updated_at);

        assert!(matches!(
            set_appointment_status(&conn, &Uuid::new_v4(), AppointmentStatus::Cancelled),
            Err(RecordError::Database(DatabaseError::NotFound { .. }))
        ));
    }

    #[test]
    fn medical_record_defaults_and_validation() {
        let conn = test_db();
        let patient = create_patient(&conn, &patient_form("Ada", "Lovelace")).unwrap();
        let form = MedicalRecordForm {
            patient_id: patient.id.to_string(),
            visit_date: "2024-02-02".into(),
            condition_name: "Common Cold".into(),
            symptoms: "Cough, Runny nose".into(),
            medications: "Paracetamol".into(),
            ..Default::default()
        };
        let record = create_medical_record(&conn, &form).unwrap();
        assert_eq!(record.status, RecordStatus::Active);
        assert_eq!(record.severity, RecordSeverity::Low);
        assert_eq!(record.symptoms, vec!["Cough", "Runny nose"]);

        let missing_condition = MedicalRecordForm {
            condition_name: " ".into(),
            ..form.clone()
        };
        assert!(matches!(
            create_medical_record(&conn, &missing_condition),
            Err(RecordError::Validation(_))
        ));

        let bad_severity = MedicalRecordForm {
            severity: Some("critical".into()),
            ..form
        };
        assert!(matches!(
            create_medical_record(&conn, &bad_severity),
            Err(RecordError::Validation(_))
        ));
    }

    #[test]
    fn medical_records_list_by_visit_descending() {
        let conn = test_db();
        let patient = create_patient(&conn, &patient_form("Ada", "Lovelace")).unwrap();
        for (date, status) in [("2023-01-01", "resolved"), ("2024-01-01", "Chronic")] {
            let form = MedicalRecordForm {
                patient_id: patient.id.to_string(),
                visit_date: date.into(),
                condition_name: "Asthma".into(),
                status: Some(status.into()),
                ..Default::default()
            };
            create_medical_record(&conn, &form).unwrap();
        }
        let records = list_medical_records(&conn).unwrap();
        assert_eq!(records[0].status, RecordStatus::Chronic);
        assert_eq!(records[1].status, RecordStatus::Resolved);
    }

    #[test]
    fn overview_counts_and_upcoming_names() {
        let conn = test_db();
        let ada = create_patient(&conn, &patient_form("Ada", "Lovelace")).unwrap();
        let gone = create_patient(&conn, &patient_form("Temp", "Patient")).unwrap();

        create_appointment(&conn, &appointment_form(ada.id, "2030-01-02")).unwrap();
        create_appointment(&conn, &appointment_form(gone.id, "2030-01-01")).unwrap();
        let done = create_appointment(&conn, &appointment_form(ada.id, "2029-12-01")).unwrap();
        set_appointment_status(&conn, &done.id, AppointmentStatus::Completed).unwrap();
        delete_patient(&conn, &gone.id).unwrap();

        let view = overview(&conn).unwrap();
        assert_eq!(view.total_patients, 1);
        assert_eq!(view.total_appointments, 3);
        assert_eq!(view.total_records, 0);
        assert_eq!(view.scheduled_appointments, 2);

        let names: Vec<&str> = view.upcoming.iter().map(|u| u.patient_name.as_str()).collect();
        assert_eq!(names, vec![UNKNOWN_PATIENT, "Ada Lovelace"]);
    }

    #[test]
    fn overview_caps_upcoming_at_five() {
        let conn = test_db();
        let ada = create_patient(&conn, &patient_form("Ada", "Lovelace")).unwrap();
        for day in 1..=8 {
            let date = format!("2030-02-{day:02}");
            create_appointment(&conn, &appointment_form(ada.id, &date)).unwrap();
        }
        let view = overview(&conn).unwrap();
        assert_eq!(view.upcoming.len(), OVERVIEW_UPCOMING_LIMIT);
        assert_eq!(view.scheduled_appointments, 8);
    }

    #[test]
    fn overview_lists_five_newest_patients() {
        let conn = test_db();
        let mut created = Vec::new();
        for i in 0..7 {
            let patient = create_patient(&conn, &patient_form(&format!("Patient{i}"), "Test")).unwrap();
            created.push(patient.id);
        }

        let view = overview(&conn).unwrap();
        assert_eq!(view.total_patients, 7);
        assert_eq!(view.recent_patients.len(), OVERVIEW_RECENT_PATIENTS_LIMIT);
        let expected: Vec<Uuid> = created.iter().rev().take(5).copied().collect();
        let ids: Vec<Uuid> = view.recent_patients.iter().map(|p| p.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn records_for_patient_filters_and_checks_patient() {
        let conn = test_db();
        let ada = create_patient(&conn, &patient_form("Ada", "Lovelace")).unwrap();
        let bob = create_patient(&conn, &patient_form("Bob", "Smith")).unwrap();
        for (patient, condition) in [(&ada, "Flu"), (&bob, "Migraine"), (&ada, "Asthma")] {
            let form = MedicalRecordForm {
                patient_id: patient.id.to_string(),
                visit_date: "2024-03-01".into(),
                condition_name: condition.into(),
                ..Default::default()
            };
            create_medical_record(&conn, &form).unwrap();
        }

        let ada_records = list_records_for_patient(&conn, &ada.id).unwrap();
        assert_eq!(ada_records.len(), 2);
        assert!(ada_records.iter().all(|r| r.patient_id == ada.id));

        assert!(matches!(
            list_records_for_patient(&conn, &Uuid::new_v4()),
            Err(RecordError::Database(DatabaseError::NotFound { .. }))
        ));
    }

    #[test]
    fn overview_serializes_flat_upcoming_entries() {
        let conn = test_db();
        let ada = create_patient(&conn, &patient_form("Ada", "Lovelace")).unwrap();
        create_appointment(&conn, &appointment_form(ada.id, "2030-02-01")).unwrap();
        let json = serde_json::to_value(overview(&conn).unwrap()).unwrap();
        assert_eq!(json["upcoming"][0]["patient_name"], "Ada Lovelace");
        assert_eq!(json["upcoming"][0]["status"], "scheduled");
    }
}
