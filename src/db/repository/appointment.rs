use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::AppointmentStatus;
use crate::models::Appointment;

use super::{format_timestamp, parse_date, parse_time, parse_timestamp, parse_uuid, TIME_FORMAT};

const APPOINTMENT_COLUMNS: &str = "id, patient_id, appointment_date, appointment_time,
     duration_minutes, purpose, doctor_name, department, status, notes, created_at, updated_at";

/// Date, then time (untimed first), then insertion order.
const CHRONOLOGICAL: &str = "ORDER BY appointment_date ASC, appointment_time ASC, rowid ASC";

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO appointments ({APPOINTMENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
        ),
        params![
            appt.id.to_string(),
            appt.patient_id.map(|id| id.to_string()),
            appt.appointment_date.to_string(),
            appt.appointment_time.map(|t| t.format(TIME_FORMAT).to_string()),
            appt.duration_minutes,
            appt.purpose,
            appt.doctor_name,
            appt.department,
            appt.status.as_str(),
            appt.notes,
            format_timestamp(&appt.created_at),
            format_timestamp(&appt.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: &Uuid) -> Result<Option<Appointment>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"),
            params![id.to_string()],
            read_appointment_row,
        )
        .optional()?;
    row.map(AppointmentRow::into_appointment).transpose()
}

pub fn list_appointments(conn: &Connection) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments {CHRONOLOGICAL}"
    ))?;
    let rows = stmt.query_map([], read_appointment_row)?;
    collect_appointments(rows)
}

/// Scheduled or confirmed appointments, soonest first.
pub fn list_upcoming_appointments(
    conn: &Connection,
    limit: usize,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE status IN ('scheduled', 'confirmed')
         {CHRONOLOGICAL} LIMIT ?1"
    ))?;
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = stmt.query_map(params![limit], read_appointment_row)?;
    collect_appointments(rows)
}

pub fn count_appointments(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM appointments", [], |row| row.get(0))?;
    Ok(count)
}

pub fn count_appointments_by_status(
    conn: &Connection,
    status: AppointmentStatus,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM appointments WHERE status = ?1",
        params![status.as_str()],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn update_appointment_status(
    conn: &Connection,
    id: &Uuid,
    status: AppointmentStatus,
    updated_at: &NaiveDateTime,
) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE appointments SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), format_timestamp(updated_at), id.to_string()],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn collect_appointments(
    rows: impl Iterator<Item = rusqlite::Result<AppointmentRow>>,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(row?.into_appointment()?);
    }
    Ok(appointments)
}

struct AppointmentRow {
    id: String,
    patient_id: Option<String>,
    appointment_date: String,
    appointment_time: Option<String>,
    duration_minutes: u32,
    purpose: String,
    doctor_name: Option<String>,
    department: Option<String>,
    status: String,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
}

fn read_appointment_row(row: &Row<'_>) -> rusqlite::Result<AppointmentRow> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        appointment_date: row.get(2)?,
        appointment_time: row.get(3)?,
        duration_minutes: row.get(4)?,
        purpose: row.get(5)?,
        doctor_name: row.get(6)?,
        department: row.get(7)?,
        status: row.get(8)?,
        notes: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

impl AppointmentRow {
    fn into_appointment(self) -> Result<Appointment, DatabaseError> {
        Ok(Appointment {
            id: parse_uuid(&self.id)?,
            patient_id: self.patient_id.as_deref().map(parse_uuid).transpose()?,
            appointment_date: parse_date(&self.appointment_date)?,
            appointment_time: self.appointment_time.as_deref().map(parse_time).transpose()?,
            duration_minutes: self.duration_minutes,
            purpose: self.purpose,
            doctor_name: self.doctor_name,
            department: self.department,
            status: AppointmentStatus::from_str(&self.status)?,
            notes: self.notes,
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
    use chrono::{NaiveDate, NaiveTime, Utc};

    fn seed_patient(conn: &Connection) -> Uuid {
        let now = Utc::now().naive_utc();
        let patient = Patient {
            id: Uuid::new_v4(),
            first_name: "Alan".into(),
            last_name: "Turing".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1912, 6, 23).unwrap(),
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

    fn make_appt(
        patient_id: Option<Uuid>,
        date: &str,
        time: Option<&str>,
        status: AppointmentStatus,
    ) -> Appointment {
        let now = Utc::now().naive_utc();
        Appointment {
            id: Uuid::new_v4(),
            patient_id,
            appointment_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            appointment_time: time.map(|t| NaiveTime::parse_from_str(t, "%H:%M").unwrap()),
            duration_minutes: 30,
            purpose: format!("{date} check-up"),
            doctor_name: Some("Dr. Osler".into()),
            department: None,
            status,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn insert_and_get_round_trip() {
        let conn = open_memory_database().unwrap();
        let pid = seed_patient(&conn);
        let appt = make_appt(Some(pid), "2024-03-10", Some("09:30"), AppointmentStatus::Scheduled);
        insert_appointment(&conn, &appt).unwrap();
        assert_eq!(get_appointment(&conn, &appt.id).unwrap().unwrap(), appt);
    }

    #[test]
    fn list_orders_by_date_then_time() {
        let conn = open_memory_database().unwrap();
        let pid = Some(seed_patient(&conn));
        let late = make_appt(pid, "2024-03-10", Some("15:00"), AppointmentStatus::Scheduled);
        let early = make_appt(pid, "2024-03-10", Some("08:15"), AppointmentStatus::Scheduled);
        let prior_day = make_appt(pid, "2024-03-09", Some("17:00"), AppointmentStatus::Completed);
        for a in [&late, &early, &prior_day] {
            insert_appointment(&conn, a).unwrap();
        }

        let ids: Vec<Uuid> = list_appointments(&conn).unwrap().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![prior_day.id, early.id, late.id]);
    }

    #[test]
    fn upcoming_excludes_closed_and_respects_limit() {
        let conn = open_memory_database().unwrap();
        let pid = Some(seed_patient(&conn));
        insert_appointment(&conn, &make_appt(pid, "2024-01-01", None, AppointmentStatus::Completed))
            .unwrap();
        insert_appointment(&conn, &make_appt(pid, "2024-01-02", None, AppointmentStatus::Cancelled))
            .unwrap();
        for day in 3..=9 {
            let date = format!("2024-01-{day:02}");
            insert_appointment(&conn, &make_appt(pid, &date, None, AppointmentStatus::Confirmed))
                .unwrap();
        }

        let upcoming = list_upcoming_appointments(&conn, 5).unwrap();
        assert_eq!(upcoming.len(), 5);
        assert!(upcoming.iter().all(|a| a.status.is_upcoming()));
        assert_eq!(upcoming[0].appointment_date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(count_appointments(&conn).unwrap(), 9);
        assert_eq!(
            count_appointments_by_status(&conn, AppointmentStatus::Confirmed).unwrap(),
            7
        );
    }

    #[test]
    fn status_update_persists() {
        let conn = open_memory_database().unwrap();
        let appt = make_appt(None, "2024-05-05", None, AppointmentStatus::Scheduled);
        insert_appointment(&conn, &appt).unwrap();

        let later = Utc::now().naive_utc();
        update_appointment_status(&conn, &appt.id, AppointmentStatus::NoShow, &later).unwrap();
        let loaded = get_appointment(&conn, &appt.id).unwrap().unwrap();
        assert_eq!(loaded.status, AppointmentStatus::NoShow);
    }

    #[test]
    fn status_update_on_missing_is_not_found() {
        let conn = open_memory_database().unwrap();
        let now = Utc::now().naive_utc();
        assert!(matches!(
            update_appointment_status(&conn, &Uuid::new_v4(), AppointmentStatus::Completed, &now),
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[test]
    fn deleting_patient_detaches_appointments() {
        let conn = open_memory_database().unwrap();
        let pid = seed_patient(&conn);
        let appt = make_appt(Some(pid), "2024-04-01", None, AppointmentStatus::Scheduled);
        insert_appointment(&conn, &appt).unwrap();

        delete_patient(&conn, &pid).unwrap();
        let loaded = get_appointment(&conn, &appt.id).unwrap().unwrap();
        assert_eq!(loaded.patient_id, None);
    }
}
