//! HTTP API.
//!
//! A thin axum adapter over the domain modules. Routes are nested under
//! `/api/` and protected by an identity middleware; login and token
//! handling live in the upstream auth gateway.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use server::{serve, start_api_server, ApiServer, ServerError};
pub use types::{ApiContext, Identity};
