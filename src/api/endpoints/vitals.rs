//! Vitals endpoints.
//!
//! - `POST /api/vitals`: validate, assess and store a reading
//! - `POST /api/vitals/assess`: validate and assess without storing
//! - `POST /api/vitals/share`: share a reading with a doctor
//! - `GET /api/vitals/:patient_id`: newest readings first
//! - `GET /api/vitals/:patient_id/alert`: latest severity for dashboards

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{parse_id, ApiContext, Identity};
use crate::connections;
use crate::models::enums::ShareMethod;
use crate::models::{Assessment, VitalsReading, VitalsRecord};
use crate::vitals::{self, VitalsAlert, VitalsSubmission};

/// `POST /api/vitals`: record the caller's own reading.
pub async fn record(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    Json(submission): Json<VitalsSubmission>,
) -> Result<(StatusCode, Json<VitalsRecord>), ApiError> {
    let patient = ctx.current_user(&identity)?;
    let record = vitals::record_vitals(ctx.store(), &patient, &submission)?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[derive(Serialize)]
pub struct AssessResponse {
    pub vitals: VitalsReading,
    pub assessment: Assessment,
}

/// `POST /api/vitals/assess`: dry run, nothing is persisted.
pub async fn assess(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    Json(submission): Json<VitalsSubmission>,
) -> Result<Json<AssessResponse>, ApiError> {
    let user = ctx.current_user(&identity)?;
    let (reading, assessment) = vitals::evaluate_submission(&submission, user.id)
        .map_err(|e| ApiError::InvalidVitals(e.issues().to_vec()))?;
    Ok(Json(AssessResponse {
        vitals: reading,
        assessment,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    pub vitals: serde_json::Value,
    pub doctor_id: String,
    pub share_method: ShareMethod,
}

/// `POST /api/vitals/share`: store a shared copy, posting to chat if asked.
pub async fn share(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<ShareRequest>,
) -> Result<(StatusCode, Json<VitalsRecord>), ApiError> {
    let patient = ctx.current_user(&identity)?;
    let doctor_id = parse_id(&body.doctor_id)?;
    let record = vitals::share_vitals(
        ctx.store(),
        &ctx.core.hub,
        &patient,
        &VitalsSubmission(body.vitals),
        &doctor_id,
        body.share_method,
    )?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// `GET /api/vitals/:patient_id`: history, newest first.
pub async fn history(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    Path(patient_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<VitalsRecord>>, ApiError> {
    let viewer = ctx.current_user(&identity)?;
    let patient_id = parse_id(&patient_id)?;
    let limit = query
        .limit
        .filter(|l| *l > 0)
        .unwrap_or(ctx.core.settings.history_limit);
    let records = vitals::vitals_history(ctx.store(), &viewer, &patient_id, limit)?;
    Ok(Json(records))
}

#[derive(Serialize)]
pub struct AlertResponse {
    pub alert: Option<VitalsAlert>,
}

/// `GET /api/vitals/:patient_id/alert`: severity of the latest reading.
pub async fn alert(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    Path(patient_id): Path<String>,
) -> Result<Json<AlertResponse>, ApiError> {
    let viewer = ctx.current_user(&identity)?;
    let patient_id = parse_id(&patient_id)?;
    if viewer.id != patient_id && !connections::is_connected(ctx.store(), &viewer.id, &patient_id)? {
        return Err(ApiError::Forbidden("access denied".into()));
    }
    let alert = vitals::latest_alert(ctx.store(), &patient_id)?;
    Ok(Json(AlertResponse { alert }))
}
