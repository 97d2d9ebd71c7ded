pub mod repository;
pub mod sqlite;
pub mod store;

pub use sqlite::*;
pub use store::{CareStore, SqliteStore};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Stored JSON column could not be decoded: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database directory unavailable: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal lock error")]
    LockPoisoned,
}
