use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::sqlite::{format_datetime, parse_date, parse_datetime, parse_uuid, DATE_FORMAT};
use crate::db::DatabaseError;
use crate::models::PregnancyTracker;

/// Store a tracker, replacing the patient's previous one.
pub fn upsert_pregnancy_tracker(
    conn: &Connection,
    tracker: &PregnancyTracker,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR REPLACE INTO pregnancy_trackers (patient_id, id, lmp_date, due_date,
         current_week, trimester, notes, checkups, symptoms, weight_log, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            tracker.patient_id.to_string(),
            tracker.id.to_string(),
            tracker.lmp_date.format(DATE_FORMAT).to_string(),
            tracker.due_date.format(DATE_FORMAT).to_string(),
            tracker.current_week,
            tracker.trimester,
            tracker.notes,
            serde_json::to_string(&tracker.checkups)?,
            serde_json::to_string(&tracker.symptoms)?,
            serde_json::to_string(&tracker.weight_log)?,
            format_datetime(&tracker.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_pregnancy_tracker(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Option<PregnancyTracker>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT patient_id, id, lmp_date, due_date, current_week, trimester, notes,
             checkups, symptoms, weight_log, created_at
             FROM pregnancy_trackers WHERE patient_id = ?1",
            params![patient_id.to_string()],
            |row| {
                Ok(TrackerRow {
                    patient_id: row.get(0)?,
                    id: row.get(1)?,
                    lmp_date: row.get(2)?,
                    due_date: row.get(3)?,
                    current_week: row.get(4)?,
                    trimester: row.get(5)?,
                    notes: row.get(6)?,
                    checkups: row.get(7)?,
                    symptoms: row.get(8)?,
                    weight_log: row.get(9)?,
                    created_at: row.get(10)?,
                })
            },
        )
        .optional()?;
    row.map(tracker_from_row).transpose()
}

struct TrackerRow {
    patient_id: String,
    id: String,
    lmp_date: String,
    due_date: String,
    current_week: u32,
    trimester: u8,
    notes: Option<String>,
    checkups: String,
    symptoms: String,
    weight_log: String,
    created_at: String,
}

fn tracker_from_row(row: TrackerRow) -> Result<PregnancyTracker, DatabaseError> {
    Ok(PregnancyTracker {
        id: parse_uuid(&row.id)?,
        patient_id: parse_uuid(&row.patient_id)?,
        lmp_date: parse_date(&row.lmp_date)?,
        due_date: parse_date(&row.due_date)?,
        current_week: row.current_week,
        trimester: row.trimester,
        notes: row.notes,
        checkups: serde_json::from_str(&row.checkups)?,
        symptoms: serde_json::from_str(&row.symptoms)?,
        weight_log: serde_json::from_str(&row.weight_log)?,
        created_at: parse_datetime(&row.created_at)?,
    })
}
