use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::sqlite::{format_datetime, parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::ConnectionStatus;
use crate::models::ConnectionRequest;

const REQUEST_COLUMNS: &str =
    "id, doctor_id, patient_id, reason, status, created_at, responded_at";

pub fn insert_connection_request(
    conn: &Connection,
    request: &ConnectionRequest,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO connection_requests (id, doctor_id, patient_id, reason, status,
         created_at, responded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            request.id.to_string(),
            request.doctor_id.to_string(),
            request.patient_id.to_string(),
            request.reason,
            request.status.as_str(),
            format_datetime(&request.created_at),
            request.responded_at.as_ref().map(format_datetime),
        ],
    )?;
    Ok(())
}

pub fn get_connection_request(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<ConnectionRequest>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {REQUEST_COLUMNS} FROM connection_requests WHERE id = ?1"),
            params![id.to_string()],
            read_request_row,
        )
        .optional()?;
    row.map(request_from_row).transpose()
}

/// Pending requests addressed to a doctor, oldest first.
pub fn get_pending_requests_for_doctor(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<ConnectionRequest>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {REQUEST_COLUMNS} FROM connection_requests
         WHERE doctor_id = ?1 AND status = 'pending'
         ORDER BY created_at ASC"
    ))?;
    let rows = stmt.query_map(params![doctor_id.to_string()], read_request_row)?;
    rows.map(|r| request_from_row(r?)).collect()
}

pub fn has_pending_request(
    conn: &Connection,
    doctor_id: &Uuid,
    patient_id: &Uuid,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM connection_requests
         WHERE doctor_id = ?1 AND patient_id = ?2 AND status = 'pending'",
        params![doctor_id.to_string(), patient_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Answer a request only while it is still pending. Returns `false` when the
/// request is missing or was already answered.
pub fn resolve_pending_request(
    conn: &Connection,
    id: &Uuid,
    status: ConnectionStatus,
    responded_at: &NaiveDateTime,
) -> Result<bool, DatabaseError> {
    let affected = conn.execute(
        "UPDATE connection_requests SET status = ?2, responded_at = ?3
         WHERE id = ?1 AND status = 'pending'",
        params![id.to_string(), status.as_str(), format_datetime(responded_at)],
    )?;
    Ok(affected > 0)
}

struct RequestRow {
    id: String,
    doctor_id: String,
    patient_id: String,
    reason: Option<String>,
    status: String,
    created_at: String,
    responded_at: Option<String>,
}

fn read_request_row(row: &rusqlite::Row) -> Result<RequestRow, rusqlite::Error> {
    Ok(RequestRow {
        id: row.get(0)?,
        doctor_id: row.get(1)?,
        patient_id: row.get(2)?,
        reason: row.get(3)?,
        status: row.get(4)?,
        created_at: row.get(5)?,
        responded_at: row.get(6)?,
    })
}

fn request_from_row(row: RequestRow) -> Result<ConnectionRequest, DatabaseError> {
    Ok(ConnectionRequest {
        id: parse_uuid(&row.id)?,
        doctor_id: parse_uuid(&row.doctor_id)?,
        patient_id: parse_uuid(&row.patient_id)?,
        reason: row.reason,
        status: ConnectionStatus::from_str(&row.status)?,
        created_at: parse_datetime(&row.created_at)?,
        responded_at: row.responded_at.as_deref().map(parse_datetime).transpose()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures::{make_doctor, make_patient, test_db};
    use crate::db::sqlite::timestamp_now;

    fn pending(doctor_id: Uuid, patient_id: Uuid) -> ConnectionRequest {
        ConnectionRequest {
            id: Uuid::new_v4(),
            doctor_id,
            patient_id,
            reason: Some("Second opinion".into()),
            status: ConnectionStatus::Pending,
            created_at: timestamp_now(),
            responded_at: None,
        }
    }

    #[test]
    fn pending_lookup_and_status_change() {
        let conn = test_db();
        let doctor = make_doctor(&conn, "Dr. Rao", "Cardiology");
        let patient = make_patient(&conn, "Asha");
        let request = pending(doctor.id, patient.id);
        insert_connection_request(&conn, &request).unwrap();

        assert!(has_pending_request(&conn, &doctor.id, &patient.id).unwrap());
        assert_eq!(get_pending_requests_for_doctor(&conn, &doctor.id).unwrap().len(), 1);

        let now = timestamp_now();
        assert!(
            resolve_pending_request(&conn, &request.id, ConnectionStatus::Approved, &now).unwrap()
        );

        let loaded = get_connection_request(&conn, &request.id).unwrap().unwrap();
        assert_eq!(loaded.status, ConnectionStatus::Approved);
        assert_eq!(loaded.responded_at, Some(now));
        assert!(!has_pending_request(&conn, &doctor.id, &patient.id).unwrap());
        assert!(get_pending_requests_for_doctor(&conn, &doctor.id).unwrap().is_empty());
    }

    #[test]
    fn answered_request_is_not_resolved_twice() {
        let conn = test_db();
        let doctor = make_doctor(&conn, "Dr. Rao", "Cardiology");
        let patient = make_patient(&conn, "Asha");
        let request = pending(doctor.id, patient.id);
        insert_connection_request(&conn, &request).unwrap();

        let now = timestamp_now();
        assert!(resolve_pending_request(&conn, &request.id, ConnectionStatus::Approved, &now).unwrap());
        assert!(!resolve_pending_request(&conn, &request.id, ConnectionStatus::Rejected, &now).unwrap());

        let loaded = get_connection_request(&conn, &request.id).unwrap().unwrap();
        assert_eq!(loaded.status, ConnectionStatus::Approved);
    }

    #[test]
    fn resolving_missing_request_changes_nothing() {
        let conn = test_db();
        let resolved = resolve_pending_request(
            &conn,
            &Uuid::new_v4(),
            ConnectionStatus::Rejected,
            &timestamp_now(),
        )
        .unwrap();
        assert!(!resolved);
    }
}
