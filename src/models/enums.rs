use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The string form is also the serde wire name.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(UserRole {
    Doctor => "doctor",
    Patient => "patient",
});

str_enum!(DietType {
    Veg => "veg",
    NonVeg => "non-veg",
});

// Declaration order is the rule priority order used by the diet generator.
str_enum!(ConditionTag {
    DailyFitness => "daily_fitness",
    Diabetes => "diabetes",
    Hypertension => "hypertension",
    HeartDisease => "heart_disease",
    WeightManagement => "weight_management",
});

str_enum!(ConnectionStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

str_enum!(ShareMethod {
    Chat => "chat",
    Email => "email",
});

str_enum!(AlertLevel {
    Medium => "medium",
    High => "high",
});

str_enum!(PregnancyAlertKind {
    Symptom => "symptom",
    BloodPressure => "blood_pressure",
    Weight => "weight",
});

impl DietType {
    /// Lenient parse for form input: anything that is not vegetarian is non-veg.
    pub fn from_input(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "veg" | "vegetarian" => DietType::Veg,
            _ => DietType::NonVeg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn condition_tag_round_trip() {
        for (variant, s) in [
            (ConditionTag::DailyFitness, "daily_fitness"),
            (ConditionTag::Diabetes, "diabetes"),
            (ConditionTag::Hypertension, "hypertension"),
            (ConditionTag::HeartDisease, "heart_disease"),
            (ConditionTag::WeightManagement, "weight_management"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(ConditionTag::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn condition_tags_order_by_priority() {
        assert!(ConditionTag::Diabetes < ConditionTag::Hypertension);
        assert!(ConditionTag::Hypertension < ConditionTag::HeartDisease);
        assert!(ConditionTag::HeartDisease < ConditionTag::WeightManagement);
    }

    #[test]
    fn connection_status_round_trip() {
        for (variant, s) in [
            (ConnectionStatus::Pending, "pending"),
            (ConnectionStatus::Approved, "approved"),
            (ConnectionStatus::Rejected, "rejected"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(ConnectionStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&DietType::NonVeg).unwrap();
        assert_eq!(json, "\"non-veg\"");
        let role: UserRole = serde_json::from_str("\"doctor\"").unwrap();
        assert_eq!(role, UserRole::Doctor);
    }

    #[test]
    fn diet_type_input_is_lenient() {
        assert_eq!(DietType::from_input("Veg"), DietType::Veg);
        assert_eq!(DietType::from_input(" vegetarian "), DietType::Veg);
        assert_eq!(DietType::from_input("non-veg"), DietType::NonVeg);
        assert_eq!(DietType::from_input("pescatarian"), DietType::NonVeg);
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(UserRole::from_str("admin").is_err());
        assert!(ShareMethod::from_str("fax").is_err());
        assert!(ConditionTag::from_str("").is_err());
    }
}
