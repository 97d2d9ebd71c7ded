//! Access logging middleware.
//!
//! Logs every API request with the caller, method, path and response
//! status. Runs innermost (after identity has been injected).

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::Identity;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let identity = req.extensions().get::<Identity>().copied();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    match identity {
        Some(id) => tracing::info!(
            user_id = %id.user_id,
            role = %id.role,
            %method,
            %path,
            status,
            "API access"
        ),
        None => tracing::info!(%method, %path, status, "API access"),
    }
    response
}
