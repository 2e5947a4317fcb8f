//! Repository layer: entity-scoped database operations.
//!
//! One sub-module per table; everything is re-exported here.
//! Timestamps are stored as sortable text, list fields as JSON arrays.

mod appointment;
mod medical_record;
mod patient;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use super::DatabaseError;

pub use appointment::*;
pub use medical_record::*;
pub use patient::*;

pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const TIME_FORMAT: &str = "%H:%M";

pub(crate) fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn parse_uuid(raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad date '{raw}': {e}")))
}

pub(crate) fn parse_time(raw: &str) -> Result<NaiveTime, DatabaseError> {
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad time '{raw}': {e}")))
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad timestamp '{raw}': {e}")))
}

pub(crate) fn encode_list(items: &[String]) -> Result<String, DatabaseError> {
    serde_json::to_string(items).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

pub(crate) fn decode_list(raw: &str) -> Result<Vec<String>, DatabaseError> {
    serde_json::from_str(raw).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}
