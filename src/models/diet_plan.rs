use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{ConditionTag, DietType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealItem {
    pub name: String,
    pub portion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub name: String,
    pub items: Vec<MealItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    pub duration: String,
    pub frequency: String,
}

/// Generator output: what to eat, how to move, and lifestyle advice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanContent {
    pub meals: Vec<Meal>,
    pub exercises: Vec<Exercise>,
    pub recommendations: Vec<String>,
}

/// Stored plan. At most one per patient; a new plan replaces the old one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietPlan {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub diet_type: DietType,
    pub conditions: Vec<ConditionTag>,
    #[serde(flatten)]
    pub content: PlanContent,
    pub created_at: NaiveDateTime,
}
