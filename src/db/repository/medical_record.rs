use std::str::FromStr;

use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::{RecordSeverity, RecordStatus};
use crate::models::MedicalRecord;

use super::{decode_list, encode_list, format_timestamp, parse_date, parse_timestamp, parse_uuid};

const RECORD_COLUMNS: &str = "id, patient_id, visit_date, condition_name, diagnosis, symptoms,
     treatment, medications, notes, status, severity, created_at, updated_at";

pub fn insert_medical_record(conn: &Connection, record: &MedicalRecord) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO medical_records ({RECORD_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
        ),
        params![
            record.id.to_string(),
            record.patient_id.to_string(),
            record.visit_date.to_string(),
            record.condition_name,
            record.diagnosis,
            encode_list(&record.symptoms)?,
            record.treatment,
            encode_list(&record.medications)?,
            record.notes,
            record.status.as_str(),
            record.severity.as_str(),
            format_timestamp(&record.created_at),
            format_timestamp(&record.updated_at),
        ],
    )?;
    Ok(())
}

/// Most recent visit first.
pub fn list_medical_records(conn: &Connection) -> Result<Vec<MedicalRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM medical_records ORDER BY visit_date DESC, rowid DESC"
    ))?;
    let rows = stmt.query_map([], read_record_row)?;
    collect_records(rows)
}

pub fn list_records_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<MedicalRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM medical_records WHERE patient_id = ?1
         ORDER BY visit_date DESC, rowid DESC"
    ))?;
    let rows = stmt.query_map(params![patient_id.to_string()], read_record_row)?;
    collect_records(rows)
}

pub fn count_medical_records(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM medical_records", [], |row| row.get(0))?;
    Ok(count)
}

fn collect_records(
    rows: impl Iterator<Item = rusqlite::Result<RecordRow>>,
) -> Result<Vec<MedicalRecord>, DatabaseError> {
    let mut records = Vec::new();
    for row in rows {
        records.push(row?.into_record()?);
    }
    Ok(records)
}

struct RecordRow {
    id: String,
    patient_id: String,
    visit_date: String,
    condition_name: String,
    diagnosis: Option<String>,
    symptoms: String,
    treatment: Option<String>,
    medications: String,
    notes: Option<String>,
    status: String,
    severity: String,
    created_at: String,
    updated_at: String,
}

fn read_record_row(row: &Row<'_>) -> rusqlite::Result<RecordRow> {
    Ok(RecordRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        visit_date: row.get(2)?,
        condition_name: row.get(3)?,
        diagnosis: row.get(4)?,
        symptoms: row.get(5)?,
        treatment: row.get(6)?,
        medications: row.get(7)?,
        notes: row.get(8)?,
        status: row.get(9)?,
        severity: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

impl RecordRow {
    fn into_record(self) -> Result<MedicalRecord, DatabaseError> {
        Ok(MedicalRecord {
            id: parse_uuid(&self.id)?,
            patient_id: parse_uuid(&self.patient_id)?,
            visit_date: parse_date(&self.visit_date)?,
            condition_name: self.condition_name,
            diagnosis: self.diagnosis,
            symptoms: decode_list(&self.symptoms)?,
            treatment: self.treatment,
            medications: decode_list(&self.medications)?,
            notes: self.notes,
            status: RecordStatus::from_str(&self.status)?,
            severity: RecordSeverity::from_str(&self.severity)?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{delete_patient, insert_patient};
    use crate::db::sqlite::open_memory_database;
    use crate::models::Patient;
    use chrono::{NaiveDate, Utc};

    fn seed_patient(conn: &Connection) -> Uuid {
        let now = Utc::now().naive_utc();
        let patient = Patient {
            id: Uuid::new_v4(),
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1950, 12, 9).unwrap(),
            gender: None,
            phone: None,
            email: None,
            address: None,
            blood_type: None,
            allergies: vec![],
            chronic_conditions: vec![],
            emergency_contact_name: None,
            emergency_contact_phone: None,
            created_at: now,
            updated_at: now,
        };
        insert_patient(conn, &patient).unwrap();
        patient.id
    }

    fn make_record(patient_id: Uuid, visit: &str, condition: &str) -> MedicalRecord {
        let now = Utc::now().naive_utc();
        MedicalRecord {
            id: Uuid::new_v4(),
            patient_id,
            visit_date: NaiveDate::parse_from_str(visit, "%Y-%m-%d").unwrap(),
            condition_name: condition.into(),
            diagnosis: Some("Viral".into()),
            symptoms: vec!["Cough".into(), "Sore throat".into()],
            treatment: None,
            medications: vec!["Paracetamol".into()],
            notes: None,
            status: RecordStatus::Active,
            severity: RecordSeverity::Medium,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn insert_and_list_round_trip() {
        let conn = open_memory_database().unwrap();
        let pid = seed_patient(&conn);
        let record = make_record(pid, "2024-02-01", "Common Cold");
        insert_medical_record(&conn, &record).unwrap();

        let all = list_medical_records(&conn).unwrap();
        assert_eq!(all, vec![record]);
    }

    #[test]
    fn list_is_most_recent_visit_first() {
        let conn = open_memory_database().unwrap();
        let pid = seed_patient(&conn);
        insert_medical_record(&conn, &make_record(pid, "2023-06-01", "A")).unwrap();
        insert_medical_record(&conn, &make_record(pid, "2024-06-01", "B")).unwrap();
        insert_medical_record(&conn, &make_record(pid, "2024-01-01", "C")).unwrap();

        let names: Vec<String> = list_medical_records(&conn)
            .unwrap()
            .into_iter()
            .map(|r| r.condition_name)
            .collect();
        assert_eq!(names, vec!["B", "C", "A"]);
    }

    #[test]
    fn records_filter_by_patient() {
        let conn = open_memory_database().unwrap();
        let a = seed_patient(&conn);
        let b = seed_patient(&conn);
        insert_medical_record(&conn, &make_record(a, "2024-01-01", "Flu")).unwrap();
        insert_medical_record(&conn, &make_record(b, "2024-01-02", "Migraine")).unwrap();

        let for_a = list_records_for_patient(&conn, &a).unwrap();
        assert_eq!(for_a.len(), 1);
        assert_eq!(for_a[0].condition_name, "Flu");
        assert_eq!(count_medical_records(&conn).unwrap(), 2);
    }

    #[test]
    fn unknown_patient_is_rejected() {
        let conn = open_memory_database().unwrap();
        let record = make_record(Uuid::new_v4(), "2024-01-01", "Flu");
        assert!(insert_medical_record(&conn, &record).is_err());
    }

    #[test]
    fn deleting_patient_cascades_to_records() {
        let conn = open_memory_database().unwrap();
        let pid = seed_patient(&conn);
        insert_medical_record(&conn, &make_record(pid, "2024-01-01", "Flu")).unwrap();
        delete_patient(&conn, &pid).unwrap();
        assert_eq!(count_medical_records(&conn).unwrap(), 0);
    }
}
