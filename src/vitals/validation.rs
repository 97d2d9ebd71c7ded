use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::models::VitalsReading;

use super::types::{ValidationIssue, VitalField, VitalsError};

/// A field as it arrived at the boundary, before typing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RawValue {
    #[default]
    Absent,
    Number(f64),
    /// Present but not a number (bad string, bool, object...).
    Unparsable,
}

/// Normalized but untyped vitals: one slot per field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawVitals {
    pub systolic: RawValue,
    pub diastolic: RawValue,
    pub heart_rate: RawValue,
    pub temperature: RawValue,
    pub oxygen_level: RawValue,
    pub glucose_level: RawValue,
}

impl RawVitals {
    pub fn get(&self, field: VitalField) -> RawValue {
        match field {
            VitalField::Systolic => self.systolic,
            VitalField::Diastolic => self.diastolic,
            VitalField::HeartRate => self.heart_rate,
            VitalField::Temperature => self.temperature,
            VitalField::OxygenLevel => self.oxygen_level,
            VitalField::GlucoseLevel => self.glucose_level,
        }
    }

    pub fn set(&mut self, field: VitalField, value: RawValue) {
        let slot = match field {
            VitalField::Systolic => &mut self.systolic,
            VitalField::Diastolic => &mut self.diastolic,
            VitalField::HeartRate => &mut self.heart_rate,
            VitalField::Temperature => &mut self.temperature,
            VitalField::OxygenLevel => &mut self.oxygen_level,
            VitalField::GlucoseLevel => &mut self.glucose_level,
        };
        *slot = value;
    }
}

/// Range-check a typed reading. Empty means valid.
pub fn validate(reading: &VitalsReading) -> Vec<ValidationIssue> {
    VitalField::ALL
        .into_iter()
        .filter(|field| {
            let value = field_value(reading, *field);
            let (min, max) = field.range();
            !(min..=max).contains(&value)
        })
        .map(ValidationIssue::out_of_range)
        .collect()
}

fn field_value(reading: &VitalsReading, field: VitalField) -> f64 {
    match field {
        VitalField::Systolic => f64::from(reading.systolic),
        VitalField::Diastolic => f64::from(reading.diastolic),
        VitalField::HeartRate => f64::from(reading.heart_rate),
        VitalField::Temperature => reading.temperature,
        VitalField::OxygenLevel => f64::from(reading.oxygen_level),
        VitalField::GlucoseLevel => f64::from(reading.glucose_level),
    }
}

/// Presence and type check for one field.
fn typed_value(field: VitalField, raw: RawValue) -> Result<f64, ValidationIssue> {
    match raw {
        RawValue::Absent => Err(ValidationIssue::missing(field)),
        RawValue::Unparsable => Err(ValidationIssue::not_numeric(field)),
        RawValue::Number(v) if !v.is_finite() => Err(ValidationIssue::not_numeric(field)),
        RawValue::Number(v) if field.is_integral() && v.fract() != 0.0 => {
            Err(ValidationIssue::not_numeric(field))
        }
        RawValue::Number(v) => Ok(v),
    }
}

/// Turn normalized input into a reading, or every reason it cannot be one.
///
/// Each field is checked on its own: presence and type, then range. Issues
/// come back in field order, at most one per field. Nothing downstream sees
/// a partial reading.
pub fn parse_and_validate(
    raw: &RawVitals,
    patient_id: Uuid,
    recorded_at: NaiveDateTime,
) -> Result<VitalsReading, VitalsError> {
    let mut values = [0.0_f64; 6];
    let mut issues = Vec::new();
    for (slot, field) in values.iter_mut().zip(VitalField::ALL) {
        match typed_value(field, raw.get(field)) {
            Ok(v) => {
                let (min, max) = field.range();
                if !(min..=max).contains(&v) {
                    issues.push(ValidationIssue::out_of_range(field));
                }
                *slot = v;
            }
            Err(issue) => issues.push(issue),
        }
    }
    if !issues.is_empty() {
        return Err(VitalsError::Invalid { issues });
    }

    // Every value is integral where required and within range here.
    let [systolic, diastolic, heart_rate, temperature, oxygen_level, glucose_level] = values;
    Ok(VitalsReading {
        patient_id,
        systolic: systolic as i32,
        diastolic: diastolic as i32,
        heart_rate: heart_rate as i32,
        temperature,
        oxygen_level: oxygen_level as i32,
        glucose_level: glucose_level as i32,
        recorded_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vitals::types::IssueKind;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn raw(values: [f64; 6]) -> RawVitals {
        let mut raw = RawVitals::default();
        for (field, v) in VitalField::ALL.into_iter().zip(values) {
            raw.set(field, RawValue::Number(v));
        }
        raw
    }

    fn normal() -> [f64; 6] {
        [120.0, 80.0, 72.0, 36.8, 98.0, 100.0]
    }

    fn index_of(field: VitalField) -> usize {
        VitalField::ALL.iter().position(|f| *f == field).unwrap()
    }

    #[test]
    fn normal_values_parse() {
        let reading = parse_and_validate(&raw(normal()), Uuid::nil(), at()).unwrap();
        assert_eq!(reading.systolic, 120);
        assert_eq!(reading.temperature, 36.8);
        assert_eq!(reading.recorded_at, at());
    }

    #[test]
    fn bounds_are_inclusive() {
        for field in VitalField::ALL {
            let (min, max) = field.range();
            for edge in [min, max] {
                let mut values = normal();
                values[index_of(field)] = edge;
                assert!(
                    parse_and_validate(&raw(values), Uuid::nil(), at()).is_ok(),
                    "{} at {edge} should be valid",
                    field.key()
                );
            }
        }
    }

    #[test]
    fn one_unit_beyond_either_bound_is_rejected() {
        for field in VitalField::ALL {
            let (min, max) = field.range();
            for beyond in [min - 1.0, max + 1.0] {
                let mut values = normal();
                values[index_of(field)] = beyond;
                let err = parse_and_validate(&raw(values), Uuid::nil(), at()).unwrap_err();
                let issues = err.issues();
                assert_eq!(issues.len(), 1, "{} at {beyond}", field.key());
                assert_eq!(issues[0].field, field);
                assert_eq!(issues[0].kind, IssueKind::OutOfRange);
            }
        }
    }

    #[test]
    fn every_out_of_range_field_is_reported_in_order() {
        let err = parse_and_validate(
            &raw([250.0, 30.0, 72.0, 45.0, 98.0, 500.0]),
            Uuid::nil(),
            at(),
        )
        .unwrap_err();
        let fields: Vec<VitalField> = err.issues().iter().map(|i| i.field).collect();
        assert_eq!(
            fields,
            vec![
                VitalField::Systolic,
                VitalField::Diastolic,
                VitalField::Temperature,
                VitalField::GlucoseLevel,
            ]
        );
    }

    #[test]
    fn missing_and_non_numeric_fields_are_issues() {
        let mut input = raw(normal());
        input.heart_rate = RawValue::Absent;
        input.glucose_level = RawValue::Unparsable;
        let err = parse_and_validate(&input, Uuid::nil(), at()).unwrap_err();
        let issues = err.issues();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].field, VitalField::HeartRate);
        assert_eq!(issues[0].kind, IssueKind::Missing);
        assert_eq!(issues[1].field, VitalField::GlucoseLevel);
        assert_eq!(issues[1].kind, IssueKind::NotNumeric);
    }

    #[test]
    fn range_errors_survive_a_missing_field() {
        let mut values = normal();
        values[index_of(VitalField::Systolic)] = 250.0;
        values[index_of(VitalField::GlucoseLevel)] = 10.0;
        let mut input = raw(values);
        input.heart_rate = RawValue::Absent;
        let err = parse_and_validate(&input, Uuid::nil(), at()).unwrap_err();
        let found: Vec<(VitalField, IssueKind)> =
            err.issues().iter().map(|i| (i.field, i.kind)).collect();
        assert_eq!(
            found,
            vec![
                (VitalField::Systolic, IssueKind::OutOfRange),
                (VitalField::HeartRate, IssueKind::Missing),
                (VitalField::GlucoseLevel, IssueKind::OutOfRange),
            ]
        );
    }

    #[test]
    fn fractional_integer_field_is_not_numeric() {
        let mut values = normal();
        values[index_of(VitalField::HeartRate)] = 72.5;
        let err = parse_and_validate(&raw(values), Uuid::nil(), at()).unwrap_err();
        assert_eq!(err.issues()[0].kind, IssueKind::NotNumeric);
    }

    #[test]
    fn fractional_temperature_is_fine() {
        let mut values = normal();
        values[index_of(VitalField::Temperature)] = 41.95;
        assert!(parse_and_validate(&raw(values), Uuid::nil(), at()).is_ok());
    }

    #[test]
    fn non_finite_is_not_numeric() {
        let mut input = raw(normal());
        input.temperature = RawValue::Number(f64::NAN);
        let err = parse_and_validate(&input, Uuid::nil(), at()).unwrap_err();
        assert_eq!(err.issues()[0].kind, IssueKind::NotNumeric);
    }

    #[test]
    fn huge_integers_are_out_of_range() {
        let mut values = normal();
        values[index_of(VitalField::GlucoseLevel)] = 1e12;
        let err = parse_and_validate(&raw(values), Uuid::nil(), at()).unwrap_err();
        assert_eq!(err.issues()[0].kind, IssueKind::OutOfRange);
    }

    #[test]
    fn messages_name_the_field() {
        let issue = ValidationIssue::out_of_range(VitalField::Systolic);
        assert_eq!(
            issue.message,
            "Invalid systolic blood pressure: must be between 60 and 200"
        );
        assert!(ValidationIssue::missing(VitalField::OxygenLevel)
            .message
            .contains("oxygen level"));
    }
}
