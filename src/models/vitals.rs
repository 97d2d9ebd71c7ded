use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ShareMethod;

/// One snapshot of the six physiological measurements for a patient.
///
/// Only ever built by the intake parser, so every field is present and
/// numeric. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalsReading {
    pub patient_id: Uuid,
    pub systolic: i32,
    pub diastolic: i32,
    pub heart_rate: i32,
    /// Degrees Celsius.
    pub temperature: f64,
    /// SpO2 percentage.
    pub oxygen_level: i32,
    /// mg/dL.
    pub glucose_level: i32,
    pub recorded_at: NaiveDateTime,
}

/// Clinical-urgency classification derived from a reading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub needs_urgent_care: bool,
    pub needs_attention: bool,
    pub concerns: Vec<String>,
    pub recommendations: Vec<String>,
}

impl Assessment {
    pub fn is_clear(&self) -> bool {
        !self.needs_urgent_care && !self.needs_attention && self.concerns.is_empty()
    }
}

/// A persisted reading with the assessment computed at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalsRecord {
    pub id: Uuid,
    pub reading: VitalsReading,
    pub assessment: Assessment,
    pub shared_with: Option<Uuid>,
    pub share_method: Option<ShareMethod>,
    pub shared_at: Option<NaiveDateTime>,
}
