use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrenatalCheckup {
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub doctor_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomLogEntry {
    pub date: NaiveDate,
    pub symptom: String,
    /// 1..=10
    pub severity: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightLogEntry {
    pub date: NaiveDate,
    pub weight: f64,
}

/// A patient's pregnancy tracker. One per patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PregnancyTracker {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub lmp_date: NaiveDate,
    pub due_date: NaiveDate,
    pub current_week: u32,
    pub trimester: u8,
    pub notes: Option<String>,
    #[serde(default)]
    pub checkups: Vec<PrenatalCheckup>,
    #[serde(default)]
    pub symptoms: Vec<SymptomLogEntry>,
    #[serde(default)]
    pub weight_log: Vec<WeightLogEntry>,
    pub created_at: NaiveDateTime,
}
