//! Health records: diagnoses and notes kept per patient.
//!
//! Readers are the patient and their connected doctors. Records are written
//! by a connected doctor or by the patient; only the author edits or deletes.

use chrono::Local;
use uuid::Uuid;

use crate::core_state::{require_user, CoreError};
use crate::db::sqlite::timestamp_now;
use crate::db::CareStore;
use crate::models::enums::UserRole;
use crate::models::{HealthRecord, HealthRecordDraft, User};

fn check_draft(draft: &HealthRecordDraft) -> Result<(), CoreError> {
    let missing: Vec<&str> = [
        ("title", &draft.title),
        ("condition", &draft.condition),
        ("description", &draft.description),
    ]
    .into_iter()
    .filter(|(_, v)| v.trim().is_empty())
    .map(|(name, _)| name)
    .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::BadRequest(format!(
            "required fields missing: {}",
            missing.join(", ")
        )))
    }
}

/// Patient self, or a doctor connected to the patient.
fn can_view(store: &dyn CareStore, viewer: &User, patient_id: &Uuid) -> Result<bool, CoreError> {
    if viewer.id == *patient_id {
        return Ok(true);
    }
    Ok(viewer.is_doctor() && store.are_connected(&viewer.id, patient_id)?)
}

pub fn list_records(
    store: &dyn CareStore,
    viewer: &User,
    patient_id: &Uuid,
) -> Result<Vec<HealthRecord>, CoreError> {
    if !can_view(store, viewer, patient_id)? {
        return Err(CoreError::Forbidden("access denied".into()));
    }
    Ok(store.health_records_for(patient_id)?)
}

fn build_record(patient_id: Uuid, author: &User, draft: HealthRecordDraft) -> HealthRecord {
    let now = timestamp_now();
    HealthRecord {
        id: Uuid::new_v4(),
        patient_id,
        title: draft.title.trim().to_string(),
        condition: draft.condition.trim().to_string(),
        diagnosis: draft.diagnosis.filter(|d| !d.trim().is_empty()),
        description: draft.description.trim().to_string(),
        date: draft.date.unwrap_or_else(|| Local::now().date_naive()),
        author_id: author.id,
        added_by: author.role,
        shared_with: vec![],
        created_at: now,
        updated_at: now,
    }
}

pub fn add_record_as_doctor(
    store: &dyn CareStore,
    doctor: &User,
    patient_id: &Uuid,
    draft: HealthRecordDraft,
) -> Result<HealthRecord, CoreError> {
    if !doctor.is_doctor() {
        return Err(CoreError::Forbidden("only doctors can add records for a patient".into()));
    }
    check_draft(&draft)?;
    let patient = require_user(store, patient_id)?;
    if !store.are_connected(&doctor.id, &patient.id)? {
        return Err(CoreError::Forbidden("not connected with this patient".into()));
    }
    let record = build_record(patient.id, doctor, draft);
    store.insert_health_record(&record)?;
    tracing::info!(record_id = %record.id, added_by = "doctor", "Health record added");
    Ok(record)
}

pub fn add_own_record(
    store: &dyn CareStore,
    patient: &User,
    draft: HealthRecordDraft,
) -> Result<HealthRecord, CoreError> {
    if patient.role != UserRole::Patient {
        return Err(CoreError::Forbidden("only patients keep their own records".into()));
    }
    check_draft(&draft)?;
    let record = build_record(patient.id, patient, draft);
    store.insert_health_record(&record)?;
    tracing::info!(record_id = %record.id, added_by = "patient", "Health record added");
    Ok(record)
}

fn authored_record(
    store: &dyn CareStore,
    author: &User,
    record_id: &Uuid,
) -> Result<HealthRecord, CoreError> {
    let record = store
        .get_health_record(record_id)?
        .ok_or_else(|| CoreError::NotFound(format!("health record {record_id}")))?;
    if record.author_id != author.id {
        return Err(CoreError::Forbidden("only the author can change this record".into()));
    }
    Ok(record)
}

pub fn update_record(
    store: &dyn CareStore,
    author: &User,
    record_id: &Uuid,
    draft: HealthRecordDraft,
) -> Result<HealthRecord, CoreError> {
    check_draft(&draft)?;
    let mut record = authored_record(store, author, record_id)?;
    record.title = draft.title.trim().to_string();
    record.condition = draft.condition.trim().to_string();
    record.diagnosis = draft.diagnosis.filter(|d| !d.trim().is_empty());
    record.description = draft.description.trim().to_string();
    if let Some(date) = draft.date {
        record.date = date;
    }
    record.updated_at = timestamp_now();
    store.update_health_record(&record)?;
    Ok(record)
}

pub fn delete_record(store: &dyn CareStore, author: &User, record_id: &Uuid) -> Result<(), CoreError> {
    authored_record(store, author, record_id)?;
    store.delete_health_record(record_id)?;
    tracing::info!(record_id = %record_id, "Health record deleted");
    Ok(())
}

/// Share a patient's record with one of their connected doctors.
pub fn share_record(
    store: &dyn CareStore,
    patient: &User,
    record_id: &Uuid,
    doctor_id: &Uuid,
) -> Result<HealthRecord, CoreError> {
    let mut record = store
        .get_health_record(record_id)?
        .ok_or_else(|| CoreError::NotFound(format!("health record {record_id}")))?;
    if record.patient_id != patient.id {
        return Err(CoreError::Forbidden("not authorized to share this record".into()));
    }
    let doctor = require_user(store, doctor_id)?;
    if !doctor.is_doctor() {
        return Err(CoreError::NotFound(format!("doctor {doctor_id}")));
    }
    if !store.are_connected(&patient.id, &doctor.id)? {
        return Err(CoreError::Forbidden("not connected with this doctor".into()));
    }
    if !record.shared_with.contains(&doctor.id) {
        record.shared_with.push(doctor.id);
        record.updated_at = timestamp_now();
        store.update_health_record(&record)?;
    }
    Ok(record)
}
