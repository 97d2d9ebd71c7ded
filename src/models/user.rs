use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::UserRole;

/// A portal account as provisioned by the authentication service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub specialization: Option<String>,
    pub experience: Option<u32>,
    pub education: Option<String>,
    pub languages: Vec<String>,
    pub bio: Option<String>,
    pub age: Option<u32>,
    pub has_active_chat: bool,
    pub created_at: NaiveDateTime,
}

impl User {
    pub fn is_doctor(&self) -> bool {
        self.role == UserRole::Doctor
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            role: self.role,
            specialization: self.specialization.clone(),
            age: self.age,
        }
    }
}

/// Public projection used in directory listings and request queues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub role: UserRole,
    pub specialization: Option<String>,
    pub age: Option<u32>,
}
