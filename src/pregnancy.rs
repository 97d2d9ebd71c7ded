//! Pregnancy tracking: date arithmetic from the last menstrual period,
//! week-by-week guidance and simple health alerts.
//!
//! All calculations take `today` explicitly so they stay pure.

use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core_state::CoreError;
use crate::db::sqlite::timestamp_now;
use crate::db::CareStore;
use crate::models::enums::{AlertLevel, PregnancyAlertKind, UserRole};
use crate::models::{PrenatalCheckup, PregnancyTracker, SymptomLogEntry, User, WeightLogEntry};

const GESTATION_DAYS: i64 = 280;
const CONCEPTION_OFFSET_DAYS: i64 = 14;
const FIRST_TRIMESTER_DAYS: i64 = 84;
const SECOND_TRIMESTER_DAYS: i64 = 182;

/// Weekly gain range in pounds, applied after the first trimester.
const MIN_WEEKLY_GAIN_LB: f64 = 0.5;
const MAX_WEEKLY_GAIN_LB: f64 = 1.0;

const WARNING_SYMPTOMS: &[&str] = &[
    "severe headache",
    "blurred vision",
    "severe abdominal pain",
    "vaginal bleeding",
    "reduced fetal movement",
    "severe swelling",
];

// ═══════════════════════════════════════════
// Types
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimesterEnds {
    pub first: NaiveDate,
    pub second: NaiveDate,
    pub third: NaiveDate,
}

/// Usual gestational windows for routine tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestones {
    pub first_ultrasound: String,
    pub genetic_testing: String,
    pub gender_reveal: String,
    pub glucose_test: String,
    pub group_b_strep: String,
}

impl Default for Milestones {
    fn default() -> Self {
        Self {
            first_ultrasound: "8-14 weeks".into(),
            genetic_testing: "10-13 weeks".into(),
            gender_reveal: "18-22 weeks".into(),
            glucose_test: "24-28 weeks".into(),
            group_b_strep: "36 weeks".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PregnancyInfo {
    pub lmp_date: NaiveDate,
    pub due_date: NaiveDate,
    pub conception_date: NaiveDate,
    pub days_pregnant: i64,
    pub current_week: u32,
    pub trimester: u8,
    pub trimester_ends: TrimesterEnds,
    pub milestones: Milestones,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyRecommendations {
    pub nutrition: Vec<String>,
    pub exercise: Vec<String>,
    pub lifestyle: Vec<String>,
    pub medical: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PregnancyAlert {
    pub level: AlertLevel,
    #[serde(rename = "type")]
    pub kind: PregnancyAlertKind,
    pub message: String,
}

/// Input to a tracking check-in.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInput {
    pub last_period_date: Option<NaiveDate>,
    /// Defaults to the week computed from the LMP.
    pub current_week: Option<u32>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    /// Pounds gained over the last week.
    pub weekly_weight_gain: Option<f64>,
    /// "systolic/diastolic", e.g. "120/80".
    pub blood_pressure: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackReport {
    pub pregnancy_info: PregnancyInfo,
    pub weekly_recommendations: WeeklyRecommendations,
    pub health_alerts: Vec<PregnancyAlert>,
}

/// Fields a patient supplies when saving a tracker.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerInput {
    pub lmp_date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[serde(default)]
    pub checkups: Vec<PrenatalCheckup>,
    #[serde(default)]
    pub symptoms: Vec<SymptomLogEntry>,
    #[serde(default)]
    pub weight_log: Vec<WeightLogEntry>,
}

// ═══════════════════════════════════════════
// Calculations
// ═══════════════════════════════════════════

pub fn trimester_for_week(week: u32) -> u8 {
    if week < 13 {
        1
    } else if week < 27 {
        2
    } else {
        3
    }
}

pub fn calculate(lmp: NaiveDate, today: NaiveDate) -> Result<PregnancyInfo, CoreError> {
    if lmp > today {
        return Err(CoreError::BadRequest(
            "Last Menstrual Period date cannot be in the future".into(),
        ));
    }
    let days_pregnant = (today - lmp).num_days();
    let current_week = u32::try_from(days_pregnant / 7).unwrap_or(u32::MAX);
    let due_date = lmp + Duration::days(GESTATION_DAYS);

    Ok(PregnancyInfo {
        lmp_date: lmp,
        due_date,
        conception_date: lmp + Duration::days(CONCEPTION_OFFSET_DAYS),
        days_pregnant,
        current_week,
        trimester: trimester_for_week(current_week),
        trimester_ends: TrimesterEnds {
            first: lmp + Duration::days(FIRST_TRIMESTER_DAYS),
            second: lmp + Duration::days(SECOND_TRIMESTER_DAYS),
            third: due_date,
        },
        milestones: Milestones::default(),
    })
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn weekly_recommendations(week: u32) -> WeeklyRecommendations {
    if week <= 12 {
        WeeklyRecommendations {
            nutrition: lines(&[
                "Take prenatal vitamins with folic acid",
                "Stay hydrated with 8-10 glasses of water daily",
                "Eat small, frequent meals to manage morning sickness",
                "Focus on protein-rich foods",
            ]),
            exercise: lines(&[
                "Light walking for 20-30 minutes daily",
                "Gentle stretching exercises",
                "Avoid high-impact activities",
            ]),
            lifestyle: lines(&[
                "Get plenty of rest",
                "Avoid alcohol and smoking",
                "Limit caffeine intake",
            ]),
            medical: lines(&[
                "Schedule first prenatal visit",
                "Get necessary blood tests",
                "Discuss any medications with healthcare provider",
            ]),
        }
    } else if week <= 26 {
        WeeklyRecommendations {
            nutrition: lines(&[
                "Increase calcium intake",
                "Add iron-rich foods to diet",
                "Continue prenatal vitamins",
                "Monitor weight gain",
            ]),
            exercise: lines(&[
                "Moderate walking or swimming",
                "Prenatal yoga classes",
                "Kegel exercises",
                "Avoid exercises that risk falling",
            ]),
            lifestyle: lines(&[
                "Start planning nursery",
                "Consider childbirth classes",
                "Sleep on left side for better blood flow",
            ]),
            medical: lines(&[
                "Schedule regular prenatal check-ups",
                "Get anatomy ultrasound",
                "Monitor blood pressure",
            ]),
        }
    } else {
        WeeklyRecommendations {
            nutrition: lines(&[
                "Eat frequent, small meals",
                "Focus on nutrient-dense foods",
                "Monitor fluid intake",
                "Watch for heartburn triggers",
            ]),
            exercise: lines(&[
                "Gentle walking",
                "Stretching exercises",
                "Pelvic floor exercises",
                "Avoid strenuous activities",
            ]),
            lifestyle: lines(&[
                "Prepare hospital bag",
                "Finalize birth plan",
                "Practice relaxation techniques",
                "Monitor fetal movements",
            ]),
            medical: lines(&[
                "Weekly check-ups in final month",
                "Monitor for labor signs",
                "Get Group B strep test",
                "Discuss birth plan with healthcare provider",
            ]),
        }
    }
}

/// Parse "sys/dia". Anything else is ignored.
fn parse_blood_pressure(raw: &str) -> Option<(f64, f64)> {
    let (sys, dia) = raw.split_once('/')?;
    let sys = sys.trim().parse::<f64>().ok()?;
    let dia = dia.trim().parse::<f64>().ok()?;
    Some((sys, dia))
}

pub fn health_alerts(
    week: u32,
    symptoms: &[String],
    weekly_weight_gain: Option<f64>,
    blood_pressure: Option<&str>,
) -> Vec<PregnancyAlert> {
    let mut alerts = Vec::new();

    for symptom in symptoms {
        let normalized = symptom.trim().to_lowercase();
        if WARNING_SYMPTOMS.contains(&normalized.as_str()) {
            alerts.push(PregnancyAlert {
                level: AlertLevel::High,
                kind: PregnancyAlertKind::Symptom,
                message: format!("Immediate medical attention recommended for: {}", symptom.trim()),
            });
        }
    }

    if let Some((sys, dia)) = blood_pressure.and_then(parse_blood_pressure) {
        if sys >= 140.0 || dia >= 90.0 {
            alerts.push(PregnancyAlert {
                level: AlertLevel::High,
                kind: PregnancyAlertKind::BloodPressure,
                message: "Blood pressure is elevated. Contact healthcare provider.".into(),
            });
        }
    }

    if let Some(gain) = weekly_weight_gain.filter(|_| week > 12) {
        let message = if gain < MIN_WEEKLY_GAIN_LB {
            Some("Weight gain is below recommended range. Discuss nutrition with healthcare provider.")
        } else if gain > MAX_WEEKLY_GAIN_LB {
            Some("Weight gain is above recommended range. Discuss with healthcare provider.")
        } else {
            None
        };
        if let Some(message) = message {
            alerts.push(PregnancyAlert {
                level: AlertLevel::Medium,
                kind: PregnancyAlertKind::Weight,
                message: message.into(),
            });
        }
    }

    alerts
}

pub fn track(input: &TrackInput, today: NaiveDate) -> Result<TrackReport, CoreError> {
    let lmp = input
        .last_period_date
        .ok_or_else(|| CoreError::BadRequest("lastPeriodDate is required".into()))?;
    let info = calculate(lmp, today)?;
    let week = input.current_week.unwrap_or(info.current_week);

    Ok(TrackReport {
        weekly_recommendations: weekly_recommendations(week),
        health_alerts: health_alerts(
            week,
            &input.symptoms,
            input.weekly_weight_gain,
            input.blood_pressure.as_deref(),
        ),
        pregnancy_info: info,
    })
}

// ═══════════════════════════════════════════
// Persistence
// ═══════════════════════════════════════════

/// Create or replace the patient's tracker, recomputing dates as of `today`.
pub fn save_tracker(
    store: &dyn CareStore,
    patient: &User,
    input: TrackerInput,
    today: NaiveDate,
) -> Result<PregnancyTracker, CoreError> {
    if patient.role != UserRole::Patient {
        return Err(CoreError::Forbidden("only patients keep a pregnancy tracker".into()));
    }
    let lmp = input
        .lmp_date
        .ok_or_else(|| CoreError::BadRequest("lmpDate is required".into()))?;
    if let Some(bad) = input.symptoms.iter().find(|s| !(1..=10).contains(&s.severity)) {
        return Err(CoreError::BadRequest(format!(
            "symptom severity must be between 1 and 10, got {}",
            bad.severity
        )));
    }
    let info = calculate(lmp, today)?;

    // Keep the tracker id stable across saves.
    let id = store
        .get_pregnancy_tracker(&patient.id)?
        .map(|t| t.id)
        .unwrap_or_else(Uuid::new_v4);

    let tracker = PregnancyTracker {
        id,
        patient_id: patient.id,
        lmp_date: lmp,
        due_date: info.due_date,
        current_week: info.current_week,
        trimester: info.trimester,
        notes: input.notes.filter(|n| !n.trim().is_empty()),
        checkups: input.checkups,
        symptoms: input.symptoms,
        weight_log: input.weight_log,
        created_at: timestamp_now(),
    };
    store.save_pregnancy_tracker(&tracker)?;
    tracing::info!(tracker_id = %tracker.id, week = tracker.current_week, "Pregnancy tracker saved");
    Ok(tracker)
}

pub fn get_tracker(
    store: &dyn CareStore,
    viewer: &User,
    patient_id: &Uuid,
) -> Result<PregnancyTracker, CoreError> {
    if viewer.id != *patient_id && !store.are_connected(&viewer.id, patient_id)? {
        return Err(CoreError::Forbidden("access denied".into()));
    }
    store
        .get_pregnancy_tracker(patient_id)?
        .ok_or_else(|| CoreError::NotFound("No pregnancy tracker found for this patient".into()))
}

/// Today's date in local time, for callers outside tests.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures::new_user;
    use crate::db::SqliteStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn due_date_is_280_days_after_lmp() {
        let info = calculate(date(2024, 1, 1), date(2024, 3, 1)).unwrap();
        assert_eq!(info.due_date, date(2024, 10, 7));
        assert_eq!(info.conception_date, date(2024, 1, 15));
        assert_eq!(info.trimester_ends.first, date(2024, 3, 25));
        assert_eq!(info.trimester_ends.second, date(2024, 7, 1));
        assert_eq!(info.trimester_ends.third, info.due_date);
        assert_eq!(info.days_pregnant, 60);
        assert_eq!(info.current_week, 8);
        assert_eq!(info.trimester, 1);
        assert_eq!(info.milestones.group_b_strep, "36 weeks");
    }

    #[test]
    fn future_lmp_is_rejected() {
        let result = calculate(date(2024, 5, 2), date(2024, 5, 1));
        assert!(matches!(result, Err(CoreError::BadRequest(_))));
    }

    #[test]
    fn lmp_today_is_week_zero() {
        let info = calculate(date(2024, 5, 1), date(2024, 5, 1)).unwrap();
        assert_eq!(info.current_week, 0);
        assert_eq!(info.trimester, 1);
    }

    #[test]
    fn trimester_boundaries() {
        assert_eq!(trimester_for_week(12), 1);
        assert_eq!(trimester_for_week(13), 2);
        assert_eq!(trimester_for_week(26), 2);
        assert_eq!(trimester_for_week(27), 3);
    }

    #[test]
    fn recommendations_switch_by_week() {
        assert_eq!(
            weekly_recommendations(12).nutrition[0],
            "Take prenatal vitamins with folic acid"
        );
        assert_eq!(weekly_recommendations(13).nutrition[0], "Increase calcium intake");
        assert_eq!(weekly_recommendations(26).medical[1], "Get anatomy ultrasound");
        assert_eq!(weekly_recommendations(27).lifestyle[0], "Prepare hospital bag");
    }

    #[test]
    fn warning_symptoms_raise_high_alerts() {
        let symptoms = vec!["Severe Headache".to_string(), "nausea".to_string()];
        let alerts = health_alerts(20, &symptoms, None, None);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::High);
        assert_eq!(alerts[0].kind, PregnancyAlertKind::Symptom);
        assert_eq!(
            alerts[0].message,
            "Immediate medical attention recommended for: Severe Headache"
        );
    }

    #[test]
    fn elevated_blood_pressure_alerts() {
        assert_eq!(health_alerts(20, &[], None, Some("140/80")).len(), 1);
        assert_eq!(health_alerts(20, &[], None, Some("120/90")).len(), 1);
        assert!(health_alerts(20, &[], None, Some("139/89")).is_empty());
        assert!(health_alerts(20, &[], None, Some("high")).is_empty());
    }

    #[test]
    fn weight_gain_checked_only_after_first_trimester() {
        assert!(health_alerts(12, &[], Some(0.1), None).is_empty());

        let low = health_alerts(20, &[], Some(0.2), None);
        assert_eq!(low[0].kind, PregnancyAlertKind::Weight);
        assert_eq!(low[0].level, AlertLevel::Medium);
        assert!(low[0].message.contains("below"));

        let high = health_alerts(20, &[], Some(1.5), None);
        assert!(high[0].message.contains("above"));

        assert!(health_alerts(20, &[], Some(0.7), None).is_empty());
    }

    #[test]
    fn track_combines_all_three() {
        let input = TrackInput {
            last_period_date: Some(date(2024, 1, 1)),
            current_week: None,
            symptoms: vec!["blurred vision".into()],
            weekly_weight_gain: Some(2.0),
            blood_pressure: Some("150/95".into()),
        };
        let report = track(&input, date(2024, 6, 1)).unwrap();
        assert_eq!(report.pregnancy_info.current_week, 21);
        assert_eq!(report.weekly_recommendations.nutrition[0], "Increase calcium intake");
        assert_eq!(report.health_alerts.len(), 3);
    }

    #[test]
    fn track_requires_lmp() {
        let result = track(&TrackInput::default(), date(2024, 6, 1));
        assert!(matches!(result, Err(CoreError::BadRequest(_))));
    }

    #[test]
    fn save_and_get_tracker() {
        let store = SqliteStore::open_in_memory().unwrap();
        let patient = new_user("Asha", UserRole::Patient);
        store.insert_user(&patient).unwrap();

        let input = TrackerInput {
            lmp_date: Some(date(2024, 1, 1)),
            notes: Some("First pregnancy".into()),
            symptoms: vec![SymptomLogEntry {
                date: date(2024, 2, 1),
                symptom: "nausea".into(),
                severity: 4,
            }],
            ..TrackerInput::default()
        };
        let saved = save_tracker(&store, &patient, input, date(2024, 3, 1)).unwrap();
        assert_eq!(saved.current_week, 8);
        assert_eq!(saved.due_date, date(2024, 10, 7));

        let again = save_tracker(
            &store,
            &patient,
            TrackerInput {
                lmp_date: Some(date(2024, 1, 1)),
                ..TrackerInput::default()
            },
            date(2024, 4, 1),
        )
        .unwrap();
        assert_eq!(again.id, saved.id);

        let loaded = get_tracker(&store, &patient, &patient.id).unwrap();
        assert_eq!(loaded, again);
    }

    #[test]
    fn severity_out_of_range_is_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        let patient = new_user("Asha", UserRole::Patient);
        store.insert_user(&patient).unwrap();
        let input = TrackerInput {
            lmp_date: Some(date(2024, 1, 1)),
            symptoms: vec![SymptomLogEntry {
                date: date(2024, 2, 1),
                symptom: "cramps".into(),
                severity: 11,
            }],
            ..TrackerInput::default()
        };
        let result = save_tracker(&store, &patient, input, date(2024, 3, 1));
        assert!(matches!(result, Err(CoreError::BadRequest(_))));
    }

    #[test]
    fn missing_tracker_is_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        let patient = new_user("Asha", UserRole::Patient);
        store.insert_user(&patient).unwrap();
        assert!(matches!(
            get_tracker(&store, &patient, &patient.id),
            Err(CoreError::NotFound(_))
        ));
    }
}
