//! Injected repository: the storage seam the domain modules depend on.
//!
//! Domain code only ever sees `dyn CareStore`, so validation, assessment and
//! plan generation stay testable without a database. `SqliteStore` is the
//! production implementation and delegates to `db::repository`.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDateTime;
use rusqlite::Connection;
use uuid::Uuid;

use super::repository;
use super::sqlite::{open_database, open_memory_database};
use super::DatabaseError;
use crate::config::Settings;
use crate::models::enums::{ConnectionStatus, UserRole};
use crate::models::{
    ChatMessage, ConnectionRequest, DietPlan, HealthRecord, PregnancyTracker, User, VitalsRecord,
};

pub trait CareStore: Send + Sync {
    // Users and links
    fn insert_user(&self, user: &User) -> Result<(), DatabaseError>;
    fn get_user(&self, id: &Uuid) -> Result<Option<User>, DatabaseError>;
    fn list_users_by_role(&self, role: UserRole) -> Result<Vec<User>, DatabaseError>;
    fn set_active_chat(&self, id: &Uuid, active: bool) -> Result<(), DatabaseError>;
    fn connect_users(&self, a: &Uuid, b: &Uuid, at: &NaiveDateTime) -> Result<(), DatabaseError>;
    fn are_connected(&self, a: &Uuid, b: &Uuid) -> Result<bool, DatabaseError>;
    fn connected_users(&self, id: &Uuid) -> Result<Vec<User>, DatabaseError>;

    // Vitals
    fn insert_vitals(&self, record: &VitalsRecord) -> Result<(), DatabaseError>;
    fn vitals_history(&self, patient_id: &Uuid, limit: usize) -> Result<Vec<VitalsRecord>, DatabaseError>;
    fn latest_vitals(&self, patient_id: &Uuid) -> Result<Option<VitalsRecord>, DatabaseError>;

    // Health records
    fn insert_health_record(&self, record: &HealthRecord) -> Result<(), DatabaseError>;
    fn update_health_record(&self, record: &HealthRecord) -> Result<(), DatabaseError>;
    fn get_health_record(&self, id: &Uuid) -> Result<Option<HealthRecord>, DatabaseError>;
    fn health_records_for(&self, patient_id: &Uuid) -> Result<Vec<HealthRecord>, DatabaseError>;
    fn delete_health_record(&self, id: &Uuid) -> Result<(), DatabaseError>;

    // Diet plans (latest wins)
    fn save_diet_plan(&self, plan: &DietPlan) -> Result<(), DatabaseError>;
    fn get_diet_plan(&self, patient_id: &Uuid) -> Result<Option<DietPlan>, DatabaseError>;

    // Pregnancy trackers (one per patient)
    fn save_pregnancy_tracker(&self, tracker: &PregnancyTracker) -> Result<(), DatabaseError>;
    fn get_pregnancy_tracker(&self, patient_id: &Uuid) -> Result<Option<PregnancyTracker>, DatabaseError>;

    // Connection requests
    fn insert_connection_request(&self, request: &ConnectionRequest) -> Result<(), DatabaseError>;
    fn get_connection_request(&self, id: &Uuid) -> Result<Option<ConnectionRequest>, DatabaseError>;
    fn pending_requests_for(&self, doctor_id: &Uuid) -> Result<Vec<ConnectionRequest>, DatabaseError>;
    fn has_pending_request(&self, doctor_id: &Uuid, patient_id: &Uuid) -> Result<bool, DatabaseError>;
    /// Answer a pending request and, on approval, link both users in the
    /// same transaction. `Ok(false)` means it was no longer pending.
    fn resolve_request(
        &self,
        request: &ConnectionRequest,
        status: ConnectionStatus,
        at: &NaiveDateTime,
    ) -> Result<bool, DatabaseError>;

    // Chat
    fn insert_chat_message(&self, message: &ChatMessage) -> Result<(), DatabaseError>;
    fn conversation(&self, a: &Uuid, b: &Uuid, limit: usize) -> Result<Vec<ChatMessage>, DatabaseError>;
}

/// SQLite-backed store. One connection, serialized behind a mutex.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self::from_connection(open_database(path)?))
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self::from_connection(open_memory_database()?))
    }

    /// Open whatever database the settings point at.
    pub fn from_settings(settings: &Settings) -> Result<Self, DatabaseError> {
        match &settings.database {
            Some(path) => {
                tracing::info!(path = %path.display(), "Opening database");
                Self::open(path)
            }
            None => {
                tracing::info!("Opening in-memory database");
                Self::open_in_memory()
            }
        }
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }
}

impl CareStore for SqliteStore {
    fn insert_user(&self, user: &User) -> Result<(), DatabaseError> {
        repository::insert_user(&*self.conn()?, user)
    }

    fn get_user(&self, id: &Uuid) -> Result<Option<User>, DatabaseError> {
        repository::get_user(&*self.conn()?, id)
    }

    fn list_users_by_role(&self, role: UserRole) -> Result<Vec<User>, DatabaseError> {
        repository::list_users_by_role(&*self.conn()?, role)
    }

    fn set_active_chat(&self, id: &Uuid, active: bool) -> Result<(), DatabaseError> {
        repository::set_active_chat(&*self.conn()?, id, active)
    }

    fn connect_users(&self, a: &Uuid, b: &Uuid, at: &NaiveDateTime) -> Result<(), DatabaseError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        repository::connect_users(&tx, a, b, at)?;
        tx.commit()?;
        Ok(())
    }

    fn are_connected(&self, a: &Uuid, b: &Uuid) -> Result<bool, DatabaseError> {
        repository::are_connected(&*self.conn()?, a, b)
    }

    fn connected_users(&self, id: &Uuid) -> Result<Vec<User>, DatabaseError> {
        repository::get_connected_users(&*self.conn()?, id)
    }

    fn insert_vitals(&self, record: &VitalsRecord) -> Result<(), DatabaseError> {
        repository::insert_vitals(&*self.conn()?, record)
    }

    fn vitals_history(&self, patient_id: &Uuid, limit: usize) -> Result<Vec<VitalsRecord>, DatabaseError> {
        repository::get_vitals_history(&*self.conn()?, patient_id, limit)
    }

    fn latest_vitals(&self, patient_id: &Uuid) -> Result<Option<VitalsRecord>, DatabaseError> {
        repository::get_latest_vitals(&*self.conn()?, patient_id)
    }

    fn insert_health_record(&self, record: &HealthRecord) -> Result<(), DatabaseError> {
        repository::insert_health_record(&*self.conn()?, record)
    }

    fn update_health_record(&self, record: &HealthRecord) -> Result<(), DatabaseError> {
        repository::update_health_record(&*self.conn()?, record)
    }

    fn get_health_record(&self, id: &Uuid) -> Result<Option<HealthRecord>, DatabaseError> {
        repository::get_health_record(&*self.conn()?, id)
    }

    fn health_records_for(&self, patient_id: &Uuid) -> Result<Vec<HealthRecord>, DatabaseError> {
        repository::get_health_records_for_patient(&*self.conn()?, patient_id)
    }

    fn delete_health_record(&self, id: &Uuid) -> Result<(), DatabaseError> {
        repository::delete_health_record(&*self.conn()?, id)
    }

    fn save_diet_plan(&self, plan: &DietPlan) -> Result<(), DatabaseError> {
        repository::upsert_diet_plan(&*self.conn()?, plan)
    }

    fn get_diet_plan(&self, patient_id: &Uuid) -> Result<Option<DietPlan>, DatabaseError> {
        repository::get_diet_plan(&*self.conn()?, patient_id)
    }

    fn save_pregnancy_tracker(&self, tracker: &PregnancyTracker) -> Result<(), DatabaseError> {
        repository::upsert_pregnancy_tracker(&*self.conn()?, tracker)
    }

    fn get_pregnancy_tracker(&self, patient_id: &Uuid) -> Result<Option<PregnancyTracker>, DatabaseError> {
        repository::get_pregnancy_tracker(&*self.conn()?, patient_id)
    }

    fn insert_connection_request(&self, request: &ConnectionRequest) -> Result<(), DatabaseError> {
        repository::insert_connection_request(&*self.conn()?, request)
    }

    fn get_connection_request(&self, id: &Uuid) -> Result<Option<ConnectionRequest>, DatabaseError> {
        repository::get_connection_request(&*self.conn()?, id)
    }

    fn pending_requests_for(&self, doctor_id: &Uuid) -> Result<Vec<ConnectionRequest>, DatabaseError> {
        repository::get_pending_requests_for_doctor(&*self.conn()?, doctor_id)
    }

    fn has_pending_request(&self, doctor_id: &Uuid, patient_id: &Uuid) -> Result<bool, DatabaseError> {
        repository::has_pending_request(&*self.conn()?, doctor_id, patient_id)
    }

    fn resolve_request(
        &self,
        request: &ConnectionRequest,
        status: ConnectionStatus,
        at: &NaiveDateTime,
    ) -> Result<bool, DatabaseError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let resolved = repository::resolve_pending_request(&tx, &request.id, status, at)?;
        if resolved && status == ConnectionStatus::Approved {
            repository::connect_users(&tx, &request.doctor_id, &request.patient_id, at)?;
        }
        tx.commit()?;
        Ok(resolved)
    }

    fn insert_chat_message(&self, message: &ChatMessage) -> Result<(), DatabaseError> {
        repository::insert_chat_message(&*self.conn()?, message)
    }

    fn conversation(&self, a: &Uuid, b: &Uuid, limit: usize) -> Result<Vec<ChatMessage>, DatabaseError> {
        repository::get_conversation(&*self.conn()?, a, b, limit)
    }
}
