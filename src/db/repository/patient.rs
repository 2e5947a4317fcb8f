use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::Gender;
use crate::models::Patient;

use super::{decode_list, encode_list, format_timestamp, parse_date, parse_timestamp, parse_uuid};

const PATIENT_COLUMNS: &str = "id, first_name, last_name, date_of_birth, gender, phone, email,
     address, blood_type, allergies, chronic_conditions, emergency_contact_name,
     emergency_contact_phone, created_at, updated_at";

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO patients ({PATIENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
        ),
        params![
            patient.id.to_string(),
            patient.first_name,
            patient.last_name,
            patient.date_of_birth.to_string(),
            patient.gender.map(|g| g.as_str()),
            patient.phone,
            patient.email,
            patient.address,
            patient.blood_type,
            encode_list(&patient.allergies)?,
            encode_list(&patient.chronic_conditions)?,
            patient.emergency_contact_name,
            patient.emergency_contact_phone,
            format_timestamp(&patient.created_at),
            format_timestamp(&patient.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1"),
            params![id.to_string()],
            read_patient_row,
        )
        .optional()?;
    row.map(PatientRow::into_patient).transpose()
}

/// Newest first.
pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY created_at DESC, rowid DESC"
    ))?;
    let rows = stmt.query_map([], read_patient_row)?;
    collect_patients(rows)
}

/// The `limit` newest patients, same order as `list_patients`.
pub fn list_recent_patients(conn: &Connection, limit: usize) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY created_at DESC, rowid DESC LIMIT ?1"
    ))?;
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = stmt.query_map(params![limit], read_patient_row)?;
    collect_patients(rows)
}

pub fn count_patients(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
    Ok(count)
}

/// Removes the patient and their medical records; appointments are kept
/// with the patient link cleared.
pub fn delete_patient(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute("DELETE FROM patients WHERE id = ?1", params![id.to_string()])?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn collect_patients(
    rows: impl Iterator<Item = rusqlite::Result<PatientRow>>,
) -> Result<Vec<Patient>, DatabaseError> {
    let mut patients = Vec::new();
    for row in rows {
        patients.push(row?.into_patient()?);
    }
    Ok(patients)
}

struct PatientRow {
    id: String,
    first_name: String,
    last_name: String,
    date_of_birth: String,
    gender: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    blood_type: Option<String>,
    allergies: String,
    chronic_conditions: String,
    emergency_contact_name: Option<String>,
    emergency_contact_phone: Option<String>,
    created_at: String,
    updated_at: String,
}

fn read_patient_row(row: &Row<'_>) -> rusqlite::Result<PatientRow> {
    Ok(PatientRow {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        date_of_birth: row.get(3)?,
        gender: row.get(4)?,
        phone: row.get(5)?,
        email: row.get(6)?,
        address: row.get(7)?,
        blood_type: row.get(8)?,
        allergies: row.get(9)?,
        chronic_conditions: row.get(10)?,
        emergency_contact_name: row.get(11)?,
        emergency_contact_phone: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

impl PatientRow {
    fn into_patient(self) -> Result<Patient, DatabaseError> {
        Ok(Patient {
            id: parse_uuid(&self.id)?,
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth: parse_date(&self.date_of_birth)?,
            gender: self.gender.as_deref().map(Gender::from_str).transpose()?,
            phone: self.phone,
            email: self.email,
            address: self.address,
            blood_type: self.blood_type,
            allergies: decode_list(&self.allergies)?,
            chronic_conditions: decode_list(&self.chronic_conditions)?,
            emergency_contact_name: self.emergency_contact_name,
            emergency_contact_phone: self.emergency_contact_phone,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}
