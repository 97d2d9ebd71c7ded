use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::sqlite::{format_datetime, parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::ShareMethod;
use crate::models::{Assessment, VitalsReading, VitalsRecord};

const VITALS_COLUMNS: &str = "id, patient_id, systolic, diastolic, heart_rate, temperature,
     oxygen_level, glucose_level, recorded_at, needs_urgent_care, needs_attention,
     concerns, recommendations, shared_with, share_method, shared_at";

/// Insert a vitals record together with the assessment computed at submission.
pub fn insert_vitals(conn: &Connection, record: &VitalsRecord) -> Result<(), DatabaseError> {
    let r = &record.reading;
    let a = &record.assessment;
    conn.execute(
        "INSERT INTO vitals (id, patient_id, systolic, diastolic, heart_rate, temperature,
         oxygen_level, glucose_level, recorded_at, needs_urgent_care, needs_attention,
         concerns, recommendations, shared_with, share_method, shared_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            record.id.to_string(),
            r.patient_id.to_string(),
            r.systolic,
            r.diastolic,
            r.heart_rate,
            r.temperature,
            r.oxygen_level,
            r.glucose_level,
            format_datetime(&r.recorded_at),
            a.needs_urgent_care as i32,
            a.needs_attention as i32,
            serde_json::to_string(&a.concerns)?,
            serde_json::to_string(&a.recommendations)?,
            record.shared_with.map(|id| id.to_string()),
            record.share_method.map(|m| m.as_str()),
            record.shared_at.as_ref().map(format_datetime),
        ],
    )?;
    Ok(())
}

pub fn get_vitals(conn: &Connection, id: &Uuid) -> Result<Option<VitalsRecord>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {VITALS_COLUMNS} FROM vitals WHERE id = ?1"),
            params![id.to_string()],
            read_vitals_row,
        )
        .optional()?;
    row.map(vitals_from_row).transpose()
}

/// Most recent records for a patient, newest first.
pub fn get_vitals_history(
    conn: &Connection,
    patient_id: &Uuid,
    limit: usize,
) -> Result<Vec<VitalsRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {VITALS_COLUMNS} FROM vitals
         WHERE patient_id = ?1
         ORDER BY recorded_at DESC, rowid DESC
         LIMIT ?2"
    ))?;
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = stmt.query_map(params![patient_id.to_string(), limit], read_vitals_row)?;
    rows.map(|r| vitals_from_row(r?)).collect()
}

pub fn get_latest_vitals(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Option<VitalsRecord>, DatabaseError> {
    Ok(get_vitals_history(conn, patient_id, 1)?.into_iter().next())
}

/// Records a patient shared with a given doctor, newest first.
pub fn get_vitals_shared_with(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<VitalsRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {VITALS_COLUMNS} FROM vitals
         WHERE shared_with = ?1
         ORDER BY shared_at DESC"
    ))?;
    let rows = stmt.query_map(params![doctor_id.to_string()], read_vitals_row)?;
    rows.map(|r| vitals_from_row(r?)).collect()
}

pub fn count_vitals(conn: &Connection, patient_id: &Uuid) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM vitals WHERE patient_id = ?1",
        params![patient_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

// Internal row type for VitalsRecord mapping
struct VitalsRow {
    id: String,
    patient_id: String,
    systolic: i32,
    diastolic: i32,
    heart_rate: i32,
    temperature: f64,
    oxygen_level: i32,
    glucose_level: i32,
    recorded_at: String,
    needs_urgent_care: i32,
    needs_attention: i32,
    concerns: String,
    recommendations: String,
    shared_with: Option<String>,
    share_method: Option<String>,
    shared_at: Option<String>,
}

fn read_vitals_row(row: &rusqlite::Row) -> Result<VitalsRow, rusqlite::Error> {
    Ok(VitalsRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        systolic: row.get(2)?,
        diastolic: row.get(3)?,
        heart_rate: row.get(4)?,
        temperature: row.get(5)?,
        oxygen_level: row.get(6)?,
        glucose_level: row.get(7)?,
        recorded_at: row.get(8)?,
        needs_urgent_care: row.get(9)?,
        needs_attention: row.get(10)?,
        concerns: row.get(11)?,
        recommendations: row.get(12)?,
        shared_with: row.get(13)?,
        share_method: row.get(14)?,
        shared_at: row.get(15)?,
    })
}

fn vitals_from_row(row: VitalsRow) -> Result<VitalsRecord, DatabaseError> {
    Ok(VitalsRecord {
        id: parse_uuid(&row.id)?,
        reading: VitalsReading {
            patient_id: parse_uuid(&row.patient_id)?,
            systolic: row.systolic,
            diastolic: row.diastolic,
            heart_rate: row.heart_rate,
            temperature: row.temperature,
            oxygen_level: row.oxygen_level,
            glucose_level: row.glucose_level,
            recorded_at: parse_datetime(&row.recorded_at)?,
        },
        assessment: Assessment {
            needs_urgent_care: row.needs_urgent_care != 0,
            needs_attention: row.needs_attention != 0,
            concerns: serde_json::from_str(&row.concerns)?,
            recommendations: serde_json::from_str(&row.recommendations)?,
        },
        shared_with: row.shared_with.as_deref().map(parse_uuid).transpose()?,
        share_method: row
            .share_method
            .as_deref()
            .map(ShareMethod::from_str)
            .transpose()?,
        shared_at: row.shared_at.as_deref().map(parse_datetime).transpose()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures::{make_doctor, make_patient, sample_record, test_db};
    use crate::db::sqlite::timestamp_now;
    use chrono::Duration;

    #[test]
    fn insert_and_get_round_trip() {
        let conn = test_db();
        let patient = make_patient(&conn, "Asha");
        let mut record = sample_record(patient.id, timestamp_now());
        record.assessment = Assessment {
            needs_urgent_care: true,
            needs_attention: false,
            concerns: vec!["Hypertensive crisis".into()],
            recommendations: vec!["Seek emergency medical care".into()],
        };
        insert_vitals(&conn, &record).unwrap();

        let loaded = get_vitals(&conn, &record.id).unwrap().unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn history_is_newest_first_and_limited() {
        let conn = test_db();
        let patient = make_patient(&conn, "Asha");
        let base = timestamp_now();
        for i in 0..5 {
            let record = sample_record(patient.id, base + Duration::minutes(i));
            insert_vitals(&conn, &record).unwrap();
        }

        let history = get_vitals_history(&conn, &patient.id, 3).unwrap();
        assert_eq!(history.len(), 3);
        assert!(history[0].reading.recorded_at > history[1].reading.recorded_at);
        assert!(history[1].reading.recorded_at > history[2].reading.recorded_at);
        assert_eq!(count_vitals(&conn, &patient.id).unwrap(), 5);
    }

    #[test]
    fn latest_is_none_without_records() {
        let conn = test_db();
        let patient = make_patient(&conn, "Asha");
        assert!(get_latest_vitals(&conn, &patient.id).unwrap().is_none());
    }

    #[test]
    fn shared_records_keep_share_metadata() {
        let conn = test_db();
        let patient = make_patient(&conn, "Asha");
        let doctor = make_doctor(&conn, "Dr. Rao", "Cardiology");
        let now = timestamp_now();
        let mut record = sample_record(patient.id, now);
        record.shared_with = Some(doctor.id);
        record.share_method = Some(ShareMethod::Email);
        record.shared_at = Some(now);
        insert_vitals(&conn, &record).unwrap();

        let shared = get_vitals_shared_with(&conn, &doctor.id).unwrap();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].share_method, Some(ShareMethod::Email));
        assert_eq!(shared[0].shared_at, Some(now));
    }

    #[test]
    fn unknown_patient_violates_foreign_key() {
        let conn = test_db();
        let record = sample_record(Uuid::new_v4(), timestamp_now());
        assert!(insert_vitals(&conn, &record).is_err());
    }
}
