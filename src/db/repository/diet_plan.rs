use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::sqlite::{format_datetime, parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::{ConditionTag, DietType};
use crate::models::{DietPlan, PlanContent};

/// Store a plan, replacing whatever plan the patient had before.
pub fn upsert_diet_plan(conn: &Connection, plan: &DietPlan) -> Result<(), DatabaseError> {
    let conditions: Vec<&str> = plan.conditions.iter().map(|c| c.as_str()).collect();
    conn.execute(
        "INSERT OR REPLACE INTO diet_plans (patient_id, id, diet_type, conditions, meals,
         exercises, recommendations, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            plan.patient_id.to_string(),
            plan.id.to_string(),
            plan.diet_type.as_str(),
            serde_json::to_string(&conditions)?,
            serde_json::to_string(&plan.content.meals)?,
            serde_json::to_string(&plan.content.exercises)?,
            serde_json::to_string(&plan.content.recommendations)?,
            format_datetime(&plan.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_diet_plan(conn: &Connection, patient_id: &Uuid) -> Result<Option<DietPlan>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT patient_id, id, diet_type, conditions, meals, exercises, recommendations,
             created_at
             FROM diet_plans WHERE patient_id = ?1",
            params![patient_id.to_string()],
            |row| {
                Ok(DietPlanRow {
                    patient_id: row.get(0)?,
                    id: row.get(1)?,
                    diet_type: row.get(2)?,
                    conditions: row.get(3)?,
                    meals: row.get(4)?,
                    exercises: row.get(5)?,
                    recommendations: row.get(6)?,
                    created_at: row.get(7)?,
                })
            },
        )
        .optional()?;
    row.map(diet_plan_from_row).transpose()
}

struct DietPlanRow {
    patient_id: String,
    id: String,
    diet_type: String,
    conditions: String,
    meals: String,
    exercises: String,
    recommendations: String,
    created_at: String,
}

fn diet_plan_from_row(row: DietPlanRow) -> Result<DietPlan, DatabaseError> {
    let tags: Vec<String> = serde_json::from_str(&row.conditions)?;
    let conditions = tags
        .iter()
        .map(|t| ConditionTag::from_str(t))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DietPlan {
        id: parse_uuid(&row.id)?,
        patient_id: parse_uuid(&row.patient_id)?,
        diet_type: DietType::from_str(&row.diet_type)?,
        conditions,
        content: PlanContent {
            meals: serde_json::from_str(&row.meals)?,
            exercises: serde_json::from_str(&row.exercises)?,
            recommendations: serde_json::from_str(&row.recommendations)?,
        },
        created_at: parse_datetime(&row.created_at)?,
    })
}
