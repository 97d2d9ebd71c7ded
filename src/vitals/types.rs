use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Assessment;

// ---------------------------------------------------------------------------
// VitalField
// ---------------------------------------------------------------------------

/// The six measured fields, in the fixed order issues are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VitalField {
    Systolic,
    Diastolic,
    HeartRate,
    Temperature,
    OxygenLevel,
    GlucoseLevel,
}

impl VitalField {
    pub const ALL: [VitalField; 6] = [
        Self::Systolic,
        Self::Diastolic,
        Self::HeartRate,
        Self::Temperature,
        Self::OxygenLevel,
        Self::GlucoseLevel,
    ];

    /// Wire name of the field.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Systolic => "systolic",
            Self::Diastolic => "diastolic",
            Self::HeartRate => "heartRate",
            Self::Temperature => "temperature",
            Self::OxygenLevel => "oxygenLevel",
            Self::GlucoseLevel => "glucoseLevel",
        }
    }

    /// Human label used in issue messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Systolic => "systolic blood pressure",
            Self::Diastolic => "diastolic blood pressure",
            Self::HeartRate => "heart rate",
            Self::Temperature => "temperature",
            Self::OxygenLevel => "oxygen level",
            Self::GlucoseLevel => "glucose level",
        }
    }

    /// Physiologically plausible input range, inclusive on both ends.
    pub fn range(&self) -> (f64, f64) {
        match self {
            Self::Systolic => (60.0, 200.0),
            Self::Diastolic => (40.0, 120.0),
            Self::HeartRate => (40.0, 200.0),
            Self::Temperature => (35.0, 42.0),
            Self::OxygenLevel => (70.0, 100.0),
            Self::GlucoseLevel => (40.0, 400.0),
        }
    }

    /// Every field except temperature is a whole number.
    pub fn is_integral(&self) -> bool {
        !matches!(self, Self::Temperature)
    }
}

// ---------------------------------------------------------------------------
// Validation issues
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Missing,
    NotNumeric,
    OutOfRange,
}

/// One field-specific reason a submission was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: VitalField,
    pub kind: IssueKind,
    pub message: String,
}

impl ValidationIssue {
    pub fn missing(field: VitalField) -> Self {
        Self {
            field,
            kind: IssueKind::Missing,
            message: format!("Missing {}", field.label()),
        }
    }

    pub fn not_numeric(field: VitalField) -> Self {
        let expected = if field.is_integral() {
            "a whole number"
        } else {
            "a number"
        };
        Self {
            field,
            kind: IssueKind::NotNumeric,
            message: format!("Invalid {}: expected {expected}", field.label()),
        }
    }

    pub fn out_of_range(field: VitalField) -> Self {
        let (min, max) = field.range();
        Self {
            field,
            kind: IssueKind::OutOfRange,
            message: format!("Invalid {}: must be between {min} and {max}", field.label()),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VitalsError {
    #[error("Invalid vitals: {}", summarize(.issues))]
    Invalid { issues: Vec<ValidationIssue> },
}

impl VitalsError {
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Self::Invalid { issues } => issues,
        }
    }
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// Severity tier
// ---------------------------------------------------------------------------

/// Severity of a single finding, or the summary tier of a whole assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalsTier {
    Normal,
    Attention,
    Urgent,
}

impl VitalsTier {
    /// Urgent dominates attention, attention dominates normal.
    pub fn of(assessment: &Assessment) -> Self {
        if assessment.needs_urgent_care {
            Self::Urgent
        } else if assessment.needs_attention {
            Self::Attention
        } else {
            Self::Normal
        }
    }
}
