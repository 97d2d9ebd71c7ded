use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ConnectionStatus;

/// A patient's request to be linked with a doctor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequest {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub reason: Option<String>,
    pub status: ConnectionStatus,
    pub created_at: NaiveDateTime,
    pub responded_at: Option<NaiveDateTime>,
}
