//! Doctor-patient linking.
//!
//! A patient asks, the addressed doctor approves or rejects. Approval links
//! both users; that link is the access gate for records, vitals history and
//! chat.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core_state::{require_user, CoreError};
use crate::db::sqlite::timestamp_now;
use crate::db::CareStore;
use crate::models::enums::{ConnectionStatus, UserRole};
use crate::models::{ConnectionRequest, User, UserSummary};

/// A pending request as shown in a doctor's queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequestView {
    #[serde(flatten)]
    pub request: ConnectionRequest,
    pub patient: UserSummary,
}

pub fn request_connection(
    store: &dyn CareStore,
    patient: &User,
    doctor_id: &Uuid,
    reason: Option<String>,
) -> Result<ConnectionRequest, CoreError> {
    if patient.role != UserRole::Patient {
        return Err(CoreError::Forbidden("only patients can request connections".into()));
    }
    let doctor = require_user(store, doctor_id)?;
    if !doctor.is_doctor() {
        return Err(CoreError::NotFound(format!("doctor {doctor_id}")));
    }
    if store.are_connected(&patient.id, &doctor.id)? {
        return Err(CoreError::Conflict("already connected with this doctor".into()));
    }
    if store.has_pending_request(&doctor.id, &patient.id)? {
        return Err(CoreError::Conflict("a request to this doctor is already pending".into()));
    }

    let request = ConnectionRequest {
        id: Uuid::new_v4(),
        doctor_id: doctor.id,
        patient_id: patient.id,
        reason: reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()),
        status: ConnectionStatus::Pending,
        created_at: timestamp_now(),
        responded_at: None,
    };
    store.insert_connection_request(&request)?;
    tracing::info!(request_id = %request.id, doctor_id = %doctor.id, "Connection requested");
    Ok(request)
}

/// Pending requests addressed to `doctor`, with a summary of each patient.
pub fn pending_requests(
    store: &dyn CareStore,
    doctor: &User,
) -> Result<Vec<PendingRequestView>, CoreError> {
    if !doctor.is_doctor() {
        return Err(CoreError::Forbidden("only doctors have a request queue".into()));
    }
    let mut views = Vec::new();
    for request in store.pending_requests_for(&doctor.id)? {
        // Requests whose patient no longer exists are skipped.
        if let Some(patient) = store.get_user(&request.patient_id)? {
            views.push(PendingRequestView {
                request,
                patient: patient.summary(),
            });
        }
    }
    Ok(views)
}

/// Approve or reject a pending request addressed to `doctor`.
pub fn respond(
    store: &dyn CareStore,
    doctor: &User,
    request_id: &Uuid,
    status: ConnectionStatus,
) -> Result<ConnectionRequest, CoreError> {
    if status == ConnectionStatus::Pending {
        return Err(CoreError::BadRequest("status must be approved or rejected".into()));
    }
    let mut request = store
        .get_connection_request(request_id)?
        .ok_or_else(|| CoreError::NotFound(format!("connection request {request_id}")))?;
    if request.doctor_id != doctor.id {
        return Err(CoreError::Forbidden("request is addressed to another doctor".into()));
    }
    if request.status != ConnectionStatus::Pending {
        return Err(CoreError::Conflict(format!(
            "request was already {}",
            request.status
        )));
    }

    let now = timestamp_now();
    if !store.resolve_request(&request, status, &now)? {
        return Err(CoreError::Conflict("request was already answered".into()));
    }
    tracing::info!(request_id = %request_id, status = %status, "Connection request answered");

    request.status = status;
    request.responded_at = Some(now);
    Ok(request)
}

pub fn is_connected(store: &dyn CareStore, a: &Uuid, b: &Uuid) -> Result<bool, CoreError> {
    Ok(store.are_connected(a, b)?)
}

pub fn connected_users(store: &dyn CareStore, user: &User) -> Result<Vec<UserSummary>, CoreError> {
    Ok(store
        .connected_users(&user.id)?
        .iter()
        .map(User::summary)
        .collect())
}

fn connected_with_role(
    store: &dyn CareStore,
    user: &User,
    role: UserRole,
) -> Result<Vec<UserSummary>, CoreError> {
    Ok(store
        .connected_users(&user.id)?
        .iter()
        .filter(|u| u.role == role)
        .map(User::summary)
        .collect())
}

pub fn doctor_patients(store: &dyn CareStore, doctor: &User) -> Result<Vec<UserSummary>, CoreError> {
    connected_with_role(store, doctor, UserRole::Patient)
}

pub fn connected_doctors(store: &dyn CareStore, patient: &User) -> Result<Vec<UserSummary>, CoreError> {
    connected_with_role(store, patient, UserRole::Doctor)
}
