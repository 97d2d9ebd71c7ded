//! Submission pipeline: normalize, validate, assess, persist.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::chat::{self, ChatHub};
use crate::core_state::CoreError;
use crate::db::sqlite::timestamp_now;
use crate::db::CareStore;
use crate::models::enums::{ShareMethod, UserRole};
use crate::models::{Assessment, User, VitalsReading, VitalsRecord};

use super::assessment::assess;
use super::types::{VitalField, VitalsError, VitalsTier};
use super::validation::{parse_and_validate, RawValue, RawVitals};

// ═══════════════════════════════════════════
// Boundary type
// ═══════════════════════════════════════════

/// Raw vitals as submitted by a client.
///
/// Three shapes are accepted: `{ "vitals": { "bloodPressure": {..}, .. } }`,
/// `{ "bloodPressure": { "systolic", "diastolic" }, "heartRate", .. }` and the
/// flat `{ "systolic", "diastolic", "heartRate", .. }`. Values may be numbers
/// or numeric strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VitalsSubmission(pub Value);

impl VitalsSubmission {
    pub fn normalize(&self) -> RawVitals {
        let empty = Map::new();
        let outer = self.0.as_object().unwrap_or(&empty);
        let root = match outer.get("vitals").and_then(Value::as_object) {
            Some(inner) => inner,
            None => outer,
        };
        let bp = root.get("bloodPressure").and_then(Value::as_object);

        let mut raw = RawVitals::default();
        for field in VitalField::ALL {
            let nested = match field {
                VitalField::Systolic | VitalField::Diastolic => {
                    bp.and_then(|bp| bp.get(field.key()))
                }
                _ => None,
            };
            let value = nested.or_else(|| root.get(field.key()));
            raw.set(field, raw_value(value));
        }
        raw
    }
}

fn raw_value(value: Option<&Value>) -> RawValue {
    match value {
        None | Some(Value::Null) => RawValue::Absent,
        Some(Value::Number(n)) => n.as_f64().map_or(RawValue::Unparsable, RawValue::Number),
        Some(Value::String(s)) if s.trim().is_empty() => RawValue::Absent,
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_or(RawValue::Unparsable, RawValue::Number),
        Some(_) => RawValue::Unparsable,
    }
}

/// Validate and assess without storing anything.
pub fn evaluate_submission(
    submission: &VitalsSubmission,
    patient_id: Uuid,
) -> Result<(VitalsReading, Assessment), VitalsError> {
    let reading = parse_and_validate(&submission.normalize(), patient_id, timestamp_now())?;
    let assessment = assess(&reading);
    Ok((reading, assessment))
}

fn log_assessment(record: &VitalsRecord) {
    match VitalsTier::of(&record.assessment) {
        VitalsTier::Urgent => tracing::warn!(
            patient_id = %record.reading.patient_id,
            record_id = %record.id,
            concerns = record.assessment.concerns.len(),
            "Vitals need urgent care"
        ),
        VitalsTier::Attention => tracing::info!(
            patient_id = %record.reading.patient_id,
            record_id = %record.id,
            concerns = record.assessment.concerns.len(),
            "Vitals need attention"
        ),
        VitalsTier::Normal => tracing::debug!(record_id = %record.id, "Vitals within normal range"),
    }
}

fn checked(
    submission: &VitalsSubmission,
    patient: &User,
) -> Result<(VitalsReading, Assessment), CoreError> {
    if patient.role != UserRole::Patient {
        return Err(CoreError::Forbidden("only patients submit vitals".into()));
    }
    evaluate_submission(submission, patient.id).map_err(|e| {
        tracing::info!(patient_id = %patient.id, issues = e.issues().len(), "Vitals rejected");
        CoreError::from(e)
    })
}

// ═══════════════════════════════════════════
// Operations
// ═══════════════════════════════════════════

/// Record a patient's own reading with its assessment.
pub fn record_vitals(
    store: &dyn CareStore,
    patient: &User,
    submission: &VitalsSubmission,
) -> Result<VitalsRecord, CoreError> {
    let (reading, assessment) = checked(submission, patient)?;
    let record = VitalsRecord {
        id: Uuid::new_v4(),
        reading,
        assessment,
        shared_with: None,
        share_method: None,
        shared_at: None,
    };
    store.insert_vitals(&record)?;
    log_assessment(&record);
    Ok(record)
}

/// Newest readings first. Visible to the patient and connected doctors.
pub fn vitals_history(
    store: &dyn CareStore,
    viewer: &User,
    patient_id: &Uuid,
    limit: usize,
) -> Result<Vec<VitalsRecord>, CoreError> {
    if viewer.id != *patient_id && !store.are_connected(&viewer.id, patient_id)? {
        return Err(CoreError::Forbidden("access denied".into()));
    }
    Ok(store.vitals_history(patient_id, limit)?)
}

fn share_summary(record: &VitalsRecord) -> String {
    let r = &record.reading;
    let mut text = format!(
        "Vitals shared on {}: BP {}/{} mmHg, heart rate {} bpm, temperature {:.1} °C, \
         oxygen {}%, glucose {} mg/dL.",
        r.recorded_at.format("%Y-%m-%d %H:%M"),
        r.systolic,
        r.diastolic,
        r.heart_rate,
        r.temperature,
        r.oxygen_level,
        r.glucose_level,
    );
    if !record.assessment.concerns.is_empty() {
        text.push_str(" Concerns: ");
        text.push_str(&record.assessment.concerns.join(", "));
        text.push('.');
    }
    text
}

/// Store a shared copy of a reading for a doctor. Sharing over chat also
/// posts a summary into the conversation.
pub fn share_vitals(
    store: &dyn CareStore,
    hub: &ChatHub,
    patient: &User,
    submission: &VitalsSubmission,
    doctor_id: &Uuid,
    method: ShareMethod,
) -> Result<VitalsRecord, CoreError> {
    let doctor = match store.get_user(doctor_id)? {
        Some(user) if user.is_doctor() => user,
        _ => return Err(CoreError::NotFound("Doctor not found".into())),
    };
    let (reading, assessment) = checked(submission, patient)?;
    if method == ShareMethod::Chat && !store.are_connected(&patient.id, &doctor.id)? {
        return Err(CoreError::Forbidden(
            "connect with this doctor before sharing over chat".into(),
        ));
    }

    let record = VitalsRecord {
        id: Uuid::new_v4(),
        reading,
        assessment,
        shared_with: Some(doctor.id),
        share_method: Some(method),
        shared_at: Some(timestamp_now()),
    };
    store.insert_vitals(&record)?;
    log_assessment(&record);

    // The shared copy is already stored; a failed summary does not undo it.
    if method == ShareMethod::Chat {
        if let Err(e) = chat::send_message(store, hub, patient, &doctor.id, &share_summary(&record)) {
            tracing::warn!(record_id = %record.id, error = %e, "Chat summary for shared vitals failed");
        }
    }
    tracing::info!(record_id = %record.id, method = %method, "Vitals shared");
    Ok(record)
}

/// Severity of the most recent reading, for dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalsAlert {
    pub record_id: Uuid,
    pub tier: VitalsTier,
    pub concerns: Vec<String>,
    pub recorded_at: chrono::NaiveDateTime,
}

pub fn latest_alert(store: &dyn CareStore, patient_id: &Uuid) -> Result<Option<VitalsAlert>, CoreError> {
    Ok(store.latest_vitals(patient_id)?.map(|record| VitalsAlert {
        record_id: record.id,
        tier: VitalsTier::of(&record.assessment),
        recorded_at: record.reading.recorded_at,
        concerns: record.assessment.concerns,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures::new_user;
    use crate::db::SqliteStore;
    use crate::vitals::types::IssueKind;
    use serde_json::json;

    struct Fixture {
        store: SqliteStore,
        hub: ChatHub,
        doctor: User,
        patient: User,
    }

    fn setup() -> Fixture {
        let store = SqliteStore::open_in_memory().unwrap();
        let doctor = new_user("Dr. Rao", UserRole::Doctor);
        let patient = new_user("Asha", UserRole::Patient);
        store.insert_user(&doctor).unwrap();
        store.insert_user(&patient).unwrap();
        Fixture {
            store,
            hub: ChatHub::new(),
            doctor,
            patient,
        }
    }

    fn connect(f: &Fixture) {
        f.store
            .connect_users(&f.doctor.id, &f.patient.id, &timestamp_now())
            .unwrap();
    }

    fn nested(sys: i64, dia: i64) -> VitalsSubmission {
        VitalsSubmission(json!({
            "vitals": {
                "bloodPressure": { "systolic": sys, "diastolic": dia },
                "heartRate": 80,
                "temperature": 37.0,
                "oxygenLevel": 97,
                "glucoseLevel": 90
            }
        }))
    }

    #[test]
    fn all_three_shapes_normalize_identically() {
        let a = nested(120, 80).normalize();
        let b = VitalsSubmission(json!({
            "bloodPressure": { "systolic": "120", "diastolic": "80" },
            "heartRate": "80", "temperature": "37.0", "oxygenLevel": 97, "glucoseLevel": 90
        }))
        .normalize();
        let c = VitalsSubmission(json!({
            "systolic": 120, "diastolic": 80, "heartRate": 80,
            "temperature": 37, "oxygenLevel": 97, "glucoseLevel": "90"
        }))
        .normalize();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.systolic, RawValue::Number(120.0));
    }

    #[test]
    fn bad_values_normalize_to_issues() {
        let raw = VitalsSubmission(json!({
            "systolic": "abc", "diastolic": "", "heartRate": true,
            "temperature": null, "oxygenLevel": [97]
        }))
        .normalize();
        assert_eq!(raw.systolic, RawValue::Unparsable);
        assert_eq!(raw.diastolic, RawValue::Absent);
        assert_eq!(raw.heart_rate, RawValue::Unparsable);
        assert_eq!(raw.temperature, RawValue::Absent);
        assert_eq!(raw.oxygen_level, RawValue::Unparsable);
        assert_eq!(raw.glucose_level, RawValue::Absent);
    }

    #[test]
    fn non_object_body_is_all_missing() {
        let raw = VitalsSubmission(json!([1, 2, 3])).normalize();
        assert_eq!(raw, RawVitals::default());
    }

    #[test]
    fn record_persists_assessment() {
        let f = setup();
        let record = record_vitals(&f.store, &f.patient, &nested(185, 95)).unwrap();
        assert!(record.assessment.needs_urgent_care);
        assert!(record
            .assessment
            .concerns
            .contains(&"Hypertensive crisis".to_string()));

        let history = vitals_history(&f.store, &f.patient, &f.patient.id, 10).unwrap();
        assert_eq!(history, vec![record]);
    }

    #[test]
    fn invalid_submission_persists_nothing() {
        let f = setup();
        let result = record_vitals(&f.store, &f.patient, &nested(250, 80));
        match result {
            Err(CoreError::Vitals(e)) => {
                assert_eq!(e.issues()[0].field, VitalField::Systolic);
                assert_eq!(e.issues()[0].kind, IssueKind::OutOfRange);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(f.store.latest_vitals(&f.patient.id).unwrap().is_none());
    }

    #[test]
    fn doctors_cannot_record_vitals() {
        let f = setup();
        let result = record_vitals(&f.store, &f.doctor, &nested(120, 80));
        assert!(matches!(result, Err(CoreError::Forbidden(_))));
    }

    #[test]
    fn history_requires_connection() {
        let f = setup();
        record_vitals(&f.store, &f.patient, &nested(120, 80)).unwrap();
        assert!(matches!(
            vitals_history(&f.store, &f.doctor, &f.patient.id, 10),
            Err(CoreError::Forbidden(_))
        ));
        connect(&f);
        assert_eq!(vitals_history(&f.store, &f.doctor, &f.patient.id, 10).unwrap().len(), 1);
    }

    #[test]
    fn history_respects_limit() {
        let f = setup();
        for _ in 0..4 {
            record_vitals(&f.store, &f.patient, &nested(120, 80)).unwrap();
        }
        assert_eq!(vitals_history(&f.store, &f.patient, &f.patient.id, 2).unwrap().len(), 2);
    }

    #[test]
    fn email_share_stores_metadata() {
        let f = setup();
        let record = share_vitals(
            &f.store,
            &f.hub,
            &f.patient,
            &nested(120, 80),
            &f.doctor.id,
            ShareMethod::Email,
        )
        .unwrap();
        assert_eq!(record.shared_with, Some(f.doctor.id));
        assert_eq!(record.share_method, Some(ShareMethod::Email));
        assert!(record.shared_at.is_some());
    }

    #[test]
    fn chat_share_posts_summary_message() {
        let f = setup();
        connect(&f);
        let mut rx = f.hub.subscribe(f.doctor.id);
        share_vitals(
            &f.store,
            &f.hub,
            &f.patient,
            &nested(185, 95),
            &f.doctor.id,
            ShareMethod::Chat,
        )
        .unwrap();

        let pushed = rx.try_recv().unwrap();
        assert!(pushed.content.contains("BP 185/95"));
        assert!(pushed.content.contains("Hypertensive crisis"));
        let convo = f.store.conversation(&f.patient.id, &f.doctor.id, 50).unwrap();
        assert_eq!(convo.len(), 1);
    }

    #[test]
    fn chat_failure_still_returns_the_shared_copy() {
        let conn = crate::db::sqlite::open_memory_database().unwrap();
        conn.execute_batch("DROP TABLE chat_messages").unwrap();
        let f = Fixture {
            store: SqliteStore::from_connection(conn),
            ..setup()
        };
        f.store.insert_user(&f.doctor).unwrap();
        f.store.insert_user(&f.patient).unwrap();
        connect(&f);

        let record = share_vitals(
            &f.store,
            &f.hub,
            &f.patient,
            &nested(120, 80),
            &f.doctor.id,
            ShareMethod::Chat,
        )
        .unwrap();
        let stored = f.store.latest_vitals(&f.patient.id).unwrap().unwrap();
        assert_eq!(stored.id, record.id);
        assert_eq!(stored.share_method, Some(ShareMethod::Chat));
    }

    #[test]
    fn chat_share_requires_connection() {
        let f = setup();
        let result = share_vitals(
            &f.store,
            &f.hub,
            &f.patient,
            &nested(120, 80),
            &f.doctor.id,
            ShareMethod::Chat,
        );
        assert!(matches!(result, Err(CoreError::Forbidden(_))));
        assert!(f.store.latest_vitals(&f.patient.id).unwrap().is_none());
    }

    #[test]
    fn share_with_non_doctor_is_not_found() {
        let f = setup();
        let other = new_user("Bilal", UserRole::Patient);
        f.store.insert_user(&other).unwrap();
        let result = share_vitals(
            &f.store,
            &f.hub,
            &f.patient,
            &nested(120, 80),
            &other.id,
            ShareMethod::Email,
        );
        assert!(matches!(result, Err(CoreError::NotFound(_))));
    }

    #[test]
    fn latest_alert_reports_tier() {
        let f = setup();
        assert!(latest_alert(&f.store, &f.patient.id).unwrap().is_none());

        record_vitals(&f.store, &f.patient, &nested(120, 80)).unwrap();
        let normal = latest_alert(&f.store, &f.patient.id).unwrap().unwrap();
        assert_eq!(normal.tier, VitalsTier::Normal);

        record_vitals(&f.store, &f.patient, &nested(150, 80)).unwrap();
        let alert = latest_alert(&f.store, &f.patient.id).unwrap().unwrap();
        assert_eq!(alert.tier, VitalsTier::Attention);
        assert_eq!(alert.concerns, vec!["High blood pressure"]);
    }

    #[test]
    fn dry_run_evaluates_without_store() {
        let (reading, assessment) = evaluate_submission(&nested(130, 85), Uuid::nil()).unwrap();
        assert_eq!(reading.systolic, 130);
        assert!(assessment.is_clear());
    }
}
