//! Repository layer: entity-scoped database operations.
//!
//! Every function takes a borrowed `Connection`; callers own locking and
//! transactions. All public functions are re-exported here.

mod chat;
mod connection;
mod diet_plan;
mod health_record;
mod pregnancy;
mod user;
mod vitals;

pub use chat::*;
pub use connection::*;
pub use diet_plan::*;
pub use health_record::*;
pub use pregnancy::*;
pub use user::*;
pub use vitals::*;

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDateTime;
    use rusqlite::Connection;
    use uuid::Uuid;

    use super::insert_user;
    use crate::db::sqlite::{open_memory_database, timestamp_now};
    use crate::models::enums::UserRole;
    use crate::models::{Assessment, User, VitalsReading, VitalsRecord};

    pub fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    pub fn new_user(name: &str, role: UserRole) -> User {
        let id = Uuid::new_v4();
        User {
            id,
            email: format!("{}@example.test", id.simple()),
            name: name.into(),
            role,
            phone: None,
            address: None,
            specialization: None,
            experience: None,
            education: None,
            languages: vec![],
            bio: None,
            age: None,
            has_active_chat: false,
            created_at: timestamp_now(),
        }
    }

    pub fn make_patient(conn: &Connection, name: &str) -> User {
        let mut user = new_user(name, UserRole::Patient);
        user.age = Some(34);
        insert_user(conn, &user).unwrap();
        user
    }

    pub fn make_doctor(conn: &Connection, name: &str, specialization: &str) -> User {
        let mut user = new_user(name, UserRole::Doctor);
        user.specialization = Some(specialization.into());
        user.experience = Some(12);
        user.languages = vec!["English".into(), "Hindi".into()];
        insert_user(conn, &user).unwrap();
        user
    }

    /// An unshared, all-normal reading.
    pub fn sample_record(patient_id: Uuid, recorded_at: NaiveDateTime) -> VitalsRecord {
        VitalsRecord {
            id: Uuid::new_v4(),
            reading: VitalsReading {
                patient_id,
                systolic: 120,
                diastolic: 80,
                heart_rate: 72,
                temperature: 36.8,
                oxygen_level: 98,
                glucose_level: 95,
                recorded_at,
            },
            assessment: Assessment::default(),
            shared_with: None,
            share_method: None,
            shared_at: None,
        }
    }
}
