//! Chat endpoints.
//!
//! - `POST /api/messages`: send to a connected user
//! - `GET /api/messages/:other_id`: the last messages with one user

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{parse_id, ApiContext, Identity};
use crate::chat;
use crate::models::ChatMessage;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub recipient_id: String,
    #[serde(default)]
    pub content: String,
}

pub async fn send(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<SendRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), ApiError> {
    let sender = ctx.current_user(&identity)?;
    let recipient_id = parse_id(&body.recipient_id)?;
    let message = chat::send_message(ctx.store(), &ctx.core.hub, &sender, &recipient_id, &body.content)?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn conversation(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    Path(other_id): Path<String>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let viewer = ctx.current_user(&identity)?;
    let other_id = parse_id(&other_id)?;
    Ok(Json(chat::conversation(ctx.store(), &viewer, &other_id)?))
}
