use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::sqlite::{format_datetime, parse_date, parse_datetime, parse_uuid, DATE_FORMAT};
use crate::db::DatabaseError;
use crate::models::enums::UserRole;
use crate::models::HealthRecord;

const RECORD_COLUMNS: &str = "id, patient_id, title, condition, diagnosis, description, date,
     author_id, added_by, shared_with, created_at, updated_at";

pub fn insert_health_record(conn: &Connection, record: &HealthRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO health_records (id, patient_id, title, condition, diagnosis, description,
         date, author_id, added_by, shared_with, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            record.id.to_string(),
            record.patient_id.to_string(),
            record.title,
            record.condition,
            record.diagnosis,
            record.description,
            record.date.format(DATE_FORMAT).to_string(),
            record.author_id.to_string(),
            record.added_by.as_str(),
            serde_json::to_string(&record.shared_with)?,
            format_datetime(&record.created_at),
            format_datetime(&record.updated_at),
        ],
    )?;
    Ok(())
}

/// Overwrite the editable fields and the share list of an existing record.
pub fn update_health_record(conn: &Connection, record: &HealthRecord) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE health_records
         SET title = ?2, condition = ?3, diagnosis = ?4, description = ?5, date = ?6,
             shared_with = ?7, updated_at = ?8
         WHERE id = ?1",
        params![
            record.id.to_string(),
            record.title,
            record.condition,
            record.diagnosis,
            record.description,
            record.date.format(DATE_FORMAT).to_string(),
            serde_json::to_string(&record.shared_with)?,
            format_datetime(&record.updated_at),
        ],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "health_record".into(),
            id: record.id.to_string(),
        });
    }
    Ok(())
}

pub fn get_health_record(conn: &Connection, id: &Uuid) -> Result<Option<HealthRecord>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {RECORD_COLUMNS} FROM health_records WHERE id = ?1"),
            params![id.to_string()],
            read_record_row,
        )
        .optional()?;
    row.map(record_from_row).transpose()
}

/// All records for a patient, most recent clinical date first.
pub fn get_health_records_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<HealthRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM health_records
         WHERE patient_id = ?1
         ORDER BY date DESC, created_at DESC"
    ))?;
    let rows = stmt.query_map(params![patient_id.to_string()], read_record_row)?;
    rows.map(|r| record_from_row(r?)).collect()
}

pub fn delete_health_record(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM health_records WHERE id = ?1",
        params![id.to_string()],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "health_record".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

struct RecordRow {
    id: String,
    patient_id: String,
    title: String,
    condition: String,
    diagnosis: Option<String>,
    description: String,
    date: String,
    author_id: String,
    added_by: String,
    shared_with: String,
    created_at: String,
    updated_at: String,
}

fn read_record_row(row: &rusqlite::Row) -> Result<RecordRow, rusqlite::Error> {
    Ok(RecordRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        title: row.get(2)?,
        condition: row.get(3)?,
        diagnosis: row.get(4)?,
        description: row.get(5)?,
        date: row.get(6)?,
        author_id: row.get(7)?,
        added_by: row.get(8)?,
        shared_with: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn record_from_row(row: RecordRow) -> Result<HealthRecord, DatabaseError> {
    Ok(HealthRecord {
        id: parse_uuid(&row.id)?,
        patient_id: parse_uuid(&row.patient_id)?,
        title: row.title,
        condition: row.condition,
        diagnosis: row.diagnosis,
        description: row.description,
        date: parse_date(&row.date)?,
        author_id: parse_uuid(&row.author_id)?,
        added_by: UserRole::from_str(&row.added_by)?,
        shared_with: serde_json::from_str(&row.shared_with)?,
        created_at: parse_datetime(&row.created_at)?,
        updated_at: parse_datetime(&row.updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures::{make_doctor, make_patient, test_db};
    use crate::db::sqlite::timestamp_now;
    use chrono::NaiveDate;

    fn record_for(patient_id: Uuid, author_id: Uuid, date: NaiveDate) -> HealthRecord {
        let now = timestamp_now();
        HealthRecord {
            id: Uuid::new_v4(),
            patient_id,
            title: "Annual checkup".into(),
            condition: "Hypertension".into(),
            diagnosis: Some("Stage 1".into()),
            description: "Follow-up in three months".into(),
            date,
            author_id,
            added_by: UserRole::Doctor,
            shared_with: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn insert_and_get_round_trip() {
        let conn = test_db();
        let patient = make_patient(&conn, "Asha");
        let doctor = make_doctor(&conn, "Dr. Rao", "Cardiology");
        let record = record_for(patient.id, doctor.id, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        insert_health_record(&conn, &record).unwrap();
        assert_eq!(get_health_record(&conn, &record.id).unwrap().unwrap(), record);
    }

    #[test]
    fn patient_listing_orders_by_date_desc() {
        let conn = test_db();
        let patient = make_patient(&conn, "Asha");
        let older = record_for(patient.id, patient.id, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        let newer = record_for(patient.id, patient.id, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        insert_health_record(&conn, &older).unwrap();
        insert_health_record(&conn, &newer).unwrap();

        let list = get_health_records_for_patient(&conn, &patient.id).unwrap();
        assert_eq!(list[0].id, newer.id);
        assert_eq!(list[1].id, older.id);
    }

    #[test]
    fn update_persists_share_list() {
        let conn = test_db();
        let patient = make_patient(&conn, "Asha");
        let doctor = make_doctor(&conn, "Dr. Rao", "Cardiology");
        let mut record = record_for(patient.id, patient.id, NaiveDate::from_ymd_opt(2024, 2, 2).unwrap());
        insert_health_record(&conn, &record).unwrap();

        record.shared_with.push(doctor.id);
        record.title = "Revised".into();
        update_health_record(&conn, &record).unwrap();

        let loaded = get_health_record(&conn, &record.id).unwrap().unwrap();
        assert_eq!(loaded.shared_with, vec![doctor.id]);
        assert_eq!(loaded.title, "Revised");
    }

    #[test]
    fn delete_missing_record_is_not_found() {
        let conn = test_db();
        let result = delete_health_record(&conn, &Uuid::new_v4());
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
