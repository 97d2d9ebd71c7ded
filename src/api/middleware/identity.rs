//! Caller identity middleware.
//!
//! Login and token validation happen upstream. The gateway forwards the
//! authenticated caller as `X-User-Id` and `X-User-Role`; this layer parses
//! them into an `Identity` extension for downstream handlers.

use std::str::FromStr;

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{Identity, USER_ID_HEADER, USER_ROLE_HEADER};
use crate::models::enums::UserRole;

/// Require identity headers on every protected route.
pub async fn require_identity(mut req: Request<axum::body::Body>, next: Next) -> Response {
    match read_identity(&req) {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}

fn read_identity<B>(req: &Request<B>) -> Result<Identity, ApiError> {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(ApiError::Unauthorized)
    };

    let user_id = Uuid::parse_str(header(USER_ID_HEADER)?).map_err(|_| ApiError::Unauthorized)?;
    let role = UserRole::from_str(&header(USER_ROLE_HEADER)?.to_ascii_lowercase())
        .map_err(|_| ApiError::Unauthorized)?;

    Ok(Identity { user_id, role })
}
