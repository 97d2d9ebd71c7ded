use crate::models::{Assessment, VitalsReading};

use super::messages::*;
use super::types::VitalsTier;

// ---------------------------------------------------------------------------
// Threshold ladder. Each vital takes at most one branch.
// ---------------------------------------------------------------------------

const BP_CRISIS_SYSTOLIC: i32 = 180;
const BP_CRISIS_DIASTOLIC: i32 = 110;
const BP_HIGH_SYSTOLIC: i32 = 140;
const BP_HIGH_DIASTOLIC: i32 = 90;
const BP_LOW_SYSTOLIC: i32 = 90;
const BP_LOW_DIASTOLIC: i32 = 60;

const HR_HIGH: i32 = 120;
const HR_LOW: i32 = 50;

const TEMP_HIGH_FEVER: f64 = 39.0;
const TEMP_MILD_FEVER: f64 = 37.8;

const O2_CRITICAL: i32 = 90;
const O2_LOW: i32 = 94;

const GLUCOSE_HIGH: i32 = 300;
const GLUCOSE_LOW: i32 = 70;

fn blood_pressure(systolic: i32, diastolic: i32) -> Option<Finding> {
    if systolic >= BP_CRISIS_SYSTOLIC || diastolic >= BP_CRISIS_DIASTOLIC {
        Some(HYPERTENSIVE_CRISIS)
    } else if systolic >= BP_HIGH_SYSTOLIC || diastolic >= BP_HIGH_DIASTOLIC {
        Some(HIGH_BLOOD_PRESSURE)
    } else if systolic <= BP_LOW_SYSTOLIC || diastolic <= BP_LOW_DIASTOLIC {
        Some(LOW_BLOOD_PRESSURE)
    } else {
        None
    }
}

fn heart_rate(bpm: i32) -> Option<Finding> {
    if bpm >= HR_HIGH {
        Some(ELEVATED_HEART_RATE)
    } else if bpm <= HR_LOW {
        Some(LOW_HEART_RATE)
    } else {
        None
    }
}

fn temperature(celsius: f64) -> Option<Finding> {
    if celsius >= TEMP_HIGH_FEVER {
        Some(HIGH_FEVER)
    } else if celsius >= TEMP_MILD_FEVER {
        Some(MILD_FEVER)
    } else {
        None
    }
}

fn oxygen(percent: i32) -> Option<Finding> {
    if percent <= O2_CRITICAL {
        Some(LOW_OXYGEN)
    } else if percent <= O2_LOW {
        Some(BELOW_NORMAL_OXYGEN)
    } else {
        None
    }
}

fn glucose(mg_dl: i32) -> Option<Finding> {
    if mg_dl >= GLUCOSE_HIGH {
        Some(HIGH_BLOOD_SUGAR)
    } else if mg_dl <= GLUCOSE_LOW {
        Some(LOW_BLOOD_SUGAR)
    } else {
        None
    }
}

/// Triggered rules in field order: blood pressure, heart rate, temperature,
/// oxygen, glucose.
pub fn evaluate(reading: &VitalsReading) -> Vec<Finding> {
    [
        blood_pressure(reading.systolic, reading.diastolic),
        heart_rate(reading.heart_rate),
        temperature(reading.temperature),
        oxygen(reading.oxygen_level),
        glucose(reading.glucose_level),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Classify a validated reading. Total and pure.
pub fn assess(reading: &VitalsReading) -> Assessment {
    let mut assessment = Assessment::default();
    for finding in evaluate(reading) {
        match finding.tier {
            VitalsTier::Urgent => assessment.needs_urgent_care = true,
            VitalsTier::Attention => assessment.needs_attention = true,
            VitalsTier::Normal => {}
        }
        assessment.concerns.push(finding.concern.to_string());
        assessment
            .recommendations
            .extend(finding.recommendations.iter().map(|r| r.to_string()));
    }
    assessment
}
