//! User directory endpoints.
//!
//! - `GET /api/doctors?specialization=`: doctor directory
//! - `GET /api/users/:id`: one user's profile

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{parse_id, ApiContext, Identity};
use crate::models::User;
use crate::users;

#[derive(Deserialize)]
pub struct DoctorQuery {
    pub specialization: Option<String>,
}

pub async fn doctors(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<DoctorQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    ctx.current_user(&identity)?;
    let doctors = users::list_doctors(ctx.store(), query.specialization.as_deref())?;
    Ok(Json(doctors))
}

pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<String>,
) -> Result<Json<User>, ApiError> {
    ctx.current_user(&identity)?;
    let user_id = parse_id(&user_id)?;
    Ok(Json(users::get_user(ctx.store(), &user_id)?))
}
