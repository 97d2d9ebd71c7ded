//! Transport-agnostic application state.
//!
//! `CoreState` is built once at startup and shared behind an `Arc` by every
//! request handler. It owns the injected store, the live chat hub and the
//! runtime settings.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::chat::ChatHub;
use crate::config::Settings;
use crate::db::{CareStore, DatabaseError, SqliteStore};
use crate::models::User;
use crate::vitals::VitalsError;

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    pub store: Arc<dyn CareStore>,
    pub hub: ChatHub,
    pub settings: Settings,
}

impl CoreState {
    pub fn new(store: Arc<dyn CareStore>, settings: Settings) -> Self {
        Self {
            store,
            hub: ChatHub::new(),
            settings,
        }
    }

    /// Open the database the settings point at.
    pub fn from_settings(settings: Settings) -> Result<Self, CoreError> {
        let store = SqliteStore::from_settings(&settings)?;
        Ok(Self::new(Arc::new(store), settings))
    }

    /// In-memory store with default settings (for testing).
    pub fn in_memory() -> Result<Self, CoreError> {
        let settings = Settings {
            database: None,
            ..Settings::default()
        };
        Self::from_settings(settings)
    }

    pub fn store(&self) -> &dyn CareStore {
        self.store.as_ref()
    }

    /// Load a user or fail with NotFound.
    pub fn require_user(&self, id: &Uuid) -> Result<User, CoreError> {
        require_user(self.store(), id)
    }
}

pub fn require_user(store: &dyn CareStore, id: &Uuid) -> Result<User, CoreError> {
    store
        .get_user(id)?
        .ok_or_else(|| CoreError::NotFound(format!("user {id}")))
}

// ═══════════════════════════════════════════════════════════
// CoreError
// ═══════════════════════════════════════════════════════════

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Vitals(#[from] VitalsError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
