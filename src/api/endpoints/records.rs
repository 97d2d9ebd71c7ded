//! Health record endpoints.
//!
//! - `GET /api/health-records/:patient_id`: records visible to the caller
//! - `POST /api/health-records/:patient_id`: a connected doctor adds a record
//! - `POST /api/patient-health-records`: a patient adds their own record
//! - `PUT /api/health-records/record/:id`: author edits
//! - `DELETE /api/health-records/record/:id`: author deletes
//! - `POST /api/health-records/record/:id/share`: owner shares with a doctor

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{parse_id, ApiContext, Identity};
use crate::models::{HealthRecord, HealthRecordDraft};
use crate::records;

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    Path(patient_id): Path<String>,
) -> Result<Json<Vec<HealthRecord>>, ApiError> {
    let viewer = ctx.current_user(&identity)?;
    let patient_id = parse_id(&patient_id)?;
    Ok(Json(records::list_records(ctx.store(), &viewer, &patient_id)?))
}

pub async fn add_for_patient(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    Path(patient_id): Path<String>,
    Json(draft): Json<HealthRecordDraft>,
) -> Result<(StatusCode, Json<HealthRecord>), ApiError> {
    let doctor = ctx.current_user(&identity)?;
    let patient_id = parse_id(&patient_id)?;
    let record = records::add_record_as_doctor(ctx.store(), &doctor, &patient_id, draft)?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn add_own(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    Json(draft): Json<HealthRecordDraft>,
) -> Result<(StatusCode, Json<HealthRecord>), ApiError> {
    let patient = ctx.current_user(&identity)?;
    let record = records::add_own_record(ctx.store(), &patient, draft)?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    Path(record_id): Path<String>,
    Json(draft): Json<HealthRecordDraft>,
) -> Result<Json<HealthRecord>, ApiError> {
    let author = ctx.current_user(&identity)?;
    let record_id = parse_id(&record_id)?;
    Ok(Json(records::update_record(ctx.store(), &author, &record_id, draft)?))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    Path(record_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let author = ctx.current_user(&identity)?;
    let record_id = parse_id(&record_id)?;
    records::delete_record(ctx.store(), &author, &record_id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    pub doctor_id: String,
}

pub async fn share(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    Path(record_id): Path<String>,
    Json(body): Json<ShareRequest>,
) -> Result<Json<HealthRecord>, ApiError> {
    let patient = ctx.current_user(&identity)?;
    let record_id = parse_id(&record_id)?;
    let doctor_id = parse_id(&body.doctor_id)?;
    Ok(Json(records::share_record(ctx.store(), &patient, &record_id, &doctor_id)?))
}
