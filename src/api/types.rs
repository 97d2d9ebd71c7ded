//! Shared types for the HTTP API layer.

use std::sync::Arc;

use uuid::Uuid;

use crate::api::error::ApiError;
use crate::core_state::{CoreError, CoreState};
use crate::db::CareStore;
use crate::models::enums::UserRole;
use crate::models::User;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }

    pub fn store(&self) -> &dyn CareStore {
        self.core.store()
    }

    /// Resolve the caller to a stored user whose role matches the claimed one.
    pub fn current_user(&self, identity: &Identity) -> Result<User, ApiError> {
        match self.core.require_user(&identity.user_id) {
            Ok(user) if user.role == identity.role => Ok(user),
            Ok(user) => {
                tracing::warn!(
                    user_id = %user.id,
                    claimed = %identity.role,
                    actual = %user.role,
                    "Identity role mismatch"
                );
                Err(ApiError::Unauthorized)
            }
            Err(CoreError::NotFound(_)) => Err(ApiError::Unauthorized),
            Err(e) => Err(e.into()),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Identity: injected by the identity middleware
// ═══════════════════════════════════════════════════════════

/// Caller identity asserted by the upstream auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: UserRole,
}

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

/// Parse a path or body id, answering 400 on malformed input.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::BadRequest(format!("Invalid ID format: {raw}")))
}
