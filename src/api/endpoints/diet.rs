//! Diet plan endpoints.
//!
//! - `POST /api/diet-plan/generate`: generate and store the caller's plan
//! - `GET /api/diet-plan/:patient_id`: the patient's current plan

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{parse_id, ApiContext, Identity};
use crate::diet;
use crate::models::DietPlan;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub diet_type: String,
    #[serde(default)]
    pub conditions: Vec<String>,
}

pub async fn generate(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<GenerateRequest>,
) -> Result<(StatusCode, Json<DietPlan>), ApiError> {
    let patient = ctx.current_user(&identity)?;
    let plan = diet::generate_and_save(ctx.store(), &patient, &body.diet_type, &body.conditions)?;
    Ok((StatusCode::CREATED, Json(plan)))
}

pub async fn latest(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    Path(patient_id): Path<String>,
) -> Result<Json<DietPlan>, ApiError> {
    let viewer = ctx.current_user(&identity)?;
    let patient_id = parse_id(&patient_id)?;
    Ok(Json(diet::latest_plan(ctx.store(), &viewer, &patient_id)?))
}
