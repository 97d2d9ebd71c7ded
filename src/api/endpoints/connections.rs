//! Connection endpoints.
//!
//! - `POST /api/connection-requests`: a patient asks a doctor to connect
//! - `GET /api/connection-requests/pending`: the caller's request queue
//! - `PUT /api/connection-requests/:id`: approve or reject
//! - `GET /api/connected-users`: everyone linked to the caller

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{parse_id, ApiContext, Identity};
use crate::connections::{self, PendingRequestView};
use crate::models::enums::ConnectionStatus;
use crate::models::{ConnectionRequest, UserSummary};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub doctor_id: String,
    pub reason: Option<String>,
}

pub async fn request(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<ConnectRequest>,
) -> Result<(StatusCode, Json<ConnectionRequest>), ApiError> {
    let patient = ctx.current_user(&identity)?;
    let doctor_id = parse_id(&body.doctor_id)?;
    let request = connections::request_connection(ctx.store(), &patient, &doctor_id, body.reason)?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn pending(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<PendingRequestView>>, ApiError> {
    let doctor = ctx.current_user(&identity)?;
    Ok(Json(connections::pending_requests(ctx.store(), &doctor)?))
}

#[derive(Deserialize)]
pub struct RespondRequest {
    pub status: ConnectionStatus,
}

pub async fn respond(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    Path(request_id): Path<String>,
    Json(body): Json<RespondRequest>,
) -> Result<Json<ConnectionRequest>, ApiError> {
    let doctor = ctx.current_user(&identity)?;
    let request_id = parse_id(&request_id)?;
    Ok(Json(connections::respond(ctx.store(), &doctor, &request_id, body.status)?))
}

pub async fn connected(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let user = ctx.current_user(&identity)?;
    Ok(Json(connections::connected_users(ctx.store(), &user)?))
}
