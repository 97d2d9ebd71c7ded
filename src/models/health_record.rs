use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::UserRole;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub title: String,
    pub condition: String,
    pub diagnosis: Option<String>,
    pub description: String,
    pub date: NaiveDate,
    pub author_id: Uuid,
    pub added_by: UserRole,
    pub shared_with: Vec<Uuid>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Fields a caller supplies when adding or editing a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthRecordDraft {
    pub title: String,
    pub condition: String,
    pub diagnosis: Option<String>,
    pub description: String,
    /// Defaults to today when absent.
    pub date: Option<NaiveDate>,
}
