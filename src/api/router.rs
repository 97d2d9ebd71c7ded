//! HTTP API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. CORS → 2. Identity → 3. Access log

use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router over shared core state.
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/vitals", post(endpoints::vitals::record))
        .route("/vitals/assess", post(endpoints::vitals::assess))
        .route("/vitals/share", post(endpoints::vitals::share))
        .route("/vitals/:patient_id", get(endpoints::vitals::history))
        .route("/vitals/:patient_id/alert", get(endpoints::vitals::alert))
        .route("/diet-plan/generate", post(endpoints::diet::generate))
        .route("/diet-plan/:patient_id", get(endpoints::diet::latest))
        .route("/pregnancy", post(endpoints::pregnancy::save))
        .route("/pregnancy/calculate", post(endpoints::pregnancy::calculate))
        .route("/pregnancy/track", post(endpoints::pregnancy::track))
        .route("/pregnancy/:patient_id", get(endpoints::pregnancy::get))
        .route(
            "/health-records/:patient_id",
            get(endpoints::records::list).post(endpoints::records::add_for_patient),
        )
        .route(
            "/health-records/record/:id",
            put(endpoints::records::update).delete(endpoints::records::delete),
        )
        .route(
            "/health-records/record/:id/share",
            post(endpoints::records::share),
        )
        .route("/patient-health-records", post(endpoints::records::add_own))
        .route("/connection-requests", post(endpoints::connections::request))
        .route(
            "/connection-requests/pending",
            get(endpoints::connections::pending),
        )
        .route(
            "/connection-requests/:id",
            put(endpoints::connections::respond),
        )
        .route("/connected-users", get(endpoints::connections::connected))
        .route("/messages", post(endpoints::chat::send))
        .route("/messages/:other_id", get(endpoints::chat::conversation))
        .route("/doctors", get(endpoints::users::doctors))
        .route("/users/:id", get(endpoints::users::get))
        .with_state(ctx)
        // Middleware stack (innermost first, outermost last):
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::identity::require_identity));

    let unprotected = Router::new().route("/health", get(endpoints::health::check));

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .nest("/api", protected.merge(unprotected))
        .layer(cors)
}
