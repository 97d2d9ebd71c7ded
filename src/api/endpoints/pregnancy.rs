//! Pregnancy endpoints.
//!
//! - `POST /api/pregnancy/calculate`: due date, week and milestones
//! - `POST /api/pregnancy/track`: calculation plus weekly advice and alerts
//! - `POST /api/pregnancy`: create or replace the caller's tracker
//! - `GET /api/pregnancy/:patient_id`: a patient's tracker

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{parse_id, ApiContext, Identity};
use crate::models::PregnancyTracker;
use crate::pregnancy::{self, PregnancyInfo, TrackInput, TrackReport, TrackerInput};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    pub last_period_date: Option<NaiveDate>,
}

pub async fn calculate(
    Json(body): Json<CalculateRequest>,
) -> Result<Json<PregnancyInfo>, ApiError> {
    let lmp = body
        .last_period_date
        .ok_or_else(|| ApiError::BadRequest("lastPeriodDate is required".into()))?;
    Ok(Json(pregnancy::calculate(lmp, pregnancy::today())?))
}

pub async fn track(Json(body): Json<TrackInput>) -> Result<Json<TrackReport>, ApiError> {
    Ok(Json(pregnancy::track(&body, pregnancy::today())?))
}

pub async fn save(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<TrackerInput>,
) -> Result<Json<PregnancyTracker>, ApiError> {
    let patient = ctx.current_user(&identity)?;
    let tracker = pregnancy::save_tracker(ctx.store(), &patient, body, pregnancy::today())?;
    Ok(Json(tracker))
}

pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    Path(patient_id): Path<String>,
) -> Result<Json<PregnancyTracker>, ApiError> {
    let viewer = ctx.current_user(&identity)?;
    let patient_id = parse_id(&patient_id)?;
    Ok(Json(pregnancy::get_tracker(ctx.store(), &viewer, &patient_id)?))
}
