//! Fixed concern and recommendation wording for each assessment rule.
//! Text is static per rule and never includes the measured value.

use super::types::VitalsTier;

/// One triggered rule: its tier, concern line and recommendation lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finding {
    pub tier: VitalsTier,
    pub concern: &'static str,
    pub recommendations: &'static [&'static str],
}

impl Finding {
    const fn urgent(concern: &'static str, recommendations: &'static [&'static str]) -> Self {
        Self {
            tier: VitalsTier::Urgent,
            concern,
            recommendations,
        }
    }

    const fn attention(concern: &'static str, recommendations: &'static [&'static str]) -> Self {
        Self {
            tier: VitalsTier::Attention,
            concern,
            recommendations,
        }
    }
}

// Blood pressure
pub const HYPERTENSIVE_CRISIS: Finding =
    Finding::urgent("Hypertensive crisis", &["Seek emergency medical care"]);
pub const HIGH_BLOOD_PRESSURE: Finding = Finding::attention(
    "High blood pressure",
    &["Schedule appointment with healthcare provider"],
);
pub const LOW_BLOOD_PRESSURE: Finding = Finding::attention(
    "Low blood pressure",
    &[
        "Stay hydrated",
        "Monitor for dizziness or fainting",
        "Avoid standing up quickly",
        "Consult with your doctor if symptoms persist",
    ],
);

// Heart rate
pub const ELEVATED_HEART_RATE: Finding =
    Finding::attention("Elevated heart rate", &["Rest and monitor heart rate"]);
pub const LOW_HEART_RATE: Finding =
    Finding::attention("Low heart rate", &["Consult healthcare provider"]);

// Temperature
pub const HIGH_FEVER: Finding = Finding::urgent(
    "High fever",
    &["Take fever medication and seek medical attention"],
);
pub const MILD_FEVER: Finding = Finding::attention("Mild fever", &["Monitor temperature and rest"]);

// Oxygen
pub const LOW_OXYGEN: Finding =
    Finding::urgent("Low oxygen saturation", &["Seek immediate medical attention"]);
pub const BELOW_NORMAL_OXYGEN: Finding = Finding::attention(
    "Below normal oxygen level",
    &["Monitor oxygen levels closely"],
);

// Glucose
pub const HIGH_BLOOD_SUGAR: Finding = Finding::urgent(
    "High blood sugar",
    &["Take insulin as prescribed and contact healthcare provider"],
);
pub const LOW_BLOOD_SUGAR: Finding = Finding::urgent(
    "Low blood sugar",
    &["Consume fast-acting carbohydrates and monitor levels"],
);
