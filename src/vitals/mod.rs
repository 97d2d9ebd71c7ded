//! Vitals validation, assessment and intake.
//!
//! `validation` and `assessment` are pure and know nothing about storage.
//! `intake` wires them to the store and the chat hub.

pub mod assessment;
pub mod intake;
pub mod messages;
pub mod types;
pub mod validation;

pub use assessment::{assess, evaluate};
pub use intake::{
    evaluate_submission, latest_alert, record_vitals, share_vitals, vitals_history, VitalsAlert,
    VitalsSubmission,
};
pub use types::{IssueKind, ValidationIssue, VitalField, VitalsError, VitalsTier};
pub use validation::{parse_and_validate, validate, RawValue, RawVitals};
