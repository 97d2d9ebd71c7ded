//! Diet and exercise plan generation.
//!
//! A fixed rule table keyed by diet type and condition tags. The generator
//! itself is pure; `generate_and_save` persists the result latest-wins.

use std::collections::BTreeSet;
use std::str::FromStr;

use uuid::Uuid;

use crate::core_state::CoreError;
use crate::db::sqlite::timestamp_now;
use crate::db::CareStore;
use crate::models::enums::{ConditionTag, DietType, UserRole};
use crate::models::{DietPlan, Exercise, Meal, MealItem, PlanContent, User};

fn item(name: &str, portion: &str) -> MealItem {
    MealItem {
        name: name.into(),
        portion: portion.into(),
    }
}

fn meal(name: &str, items: Vec<MealItem>) -> Meal {
    Meal {
        name: name.into(),
        items,
    }
}

fn exercise(name: &str, duration: &str, frequency: &str) -> Exercise {
    Exercise {
        name: name.into(),
        duration: duration.into(),
        frequency: frequency.into(),
    }
}

fn strings(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}

// ═══════════════════════════════════════════
// High-activity template
// ═══════════════════════════════════════════

const FITNESS_RECOMMENDATIONS: &[&str] = &[
    "Stay hydrated by drinking 8-10 glasses of water daily",
    "Eat protein-rich foods within 30 minutes after workout",
    "Get 7-8 hours of quality sleep",
    "Include a mix of cardio and strength training",
    "Take rest days to allow muscle recovery",
    "Monitor your progress and adjust intensity gradually",
    "Maintain a food diary to track nutrition",
    "Consider pre and post-workout nutrition timing",
];

fn fitness_plan(diet_type: DietType) -> PlanContent {
    let veg = diet_type == DietType::Veg;
    let lunch_protein = if veg { "Lentils Curry" } else { "Grilled Chicken" };
    let dinner_protein = if veg { "Tofu Stir Fry" } else { "Fish/Lean Meat" };

    PlanContent {
        meals: vec![
            meal(
                "Breakfast",
                vec![
                    item("Oats with Milk", "1 cup"),
                    item("Mixed Fruits", "1 cup"),
                    item("Nuts and Seeds Mix", "1 handful"),
                ],
            ),
            meal(
                "Mid-Morning Snack",
                vec![
                    item("Greek Yogurt", "1 cup"),
                    item("Honey", "1 tsp"),
                    item("Mixed Berries", "1/2 cup"),
                ],
            ),
            meal(
                "Lunch",
                vec![
                    item(lunch_protein, "150g"),
                    item("Brown Rice", "1 cup"),
                    item("Mixed Vegetables", "1 cup"),
                    item("Salad", "1 bowl"),
                ],
            ),
            meal(
                "Evening Snack",
                vec![item("Protein Shake", "1 glass"), item("Banana", "1 medium")],
            ),
            meal(
                "Dinner",
                vec![
                    item(dinner_protein, "150g"),
                    item("Quinoa/Brown Rice", "1 cup"),
                    item("Steamed Vegetables", "1 cup"),
                ],
            ),
        ],
        exercises: vec![
            exercise("Morning Cardio (Running/Cycling)", "30 minutes", "5-6 times per week"),
            exercise("Strength Training", "45 minutes", "3-4 times per week"),
            exercise("Yoga/Stretching", "20 minutes", "Daily"),
            exercise("Evening Walk", "20 minutes", "Daily"),
        ],
        recommendations: strings(FITNESS_RECOMMENDATIONS),
    }
}

// ═══════════════════════════════════════════
// Four-meal template
// ═══════════════════════════════════════════

fn base_meals(diet_type: DietType) -> Vec<Meal> {
    let (breakfast, lunch, dinner) = match diet_type {
        DietType::Veg => (
            vec![
                item("Oatmeal with berries", "1 cup"),
                item("Greek yogurt", "1/2 cup"),
                item("Flaxseeds", "1 tablespoon"),
            ],
            vec![
                item("Quinoa bowl", "1 cup"),
                item("Mixed vegetables", "2 cups"),
                item("Chickpeas", "1/2 cup"),
            ],
            vec![
                item("Lentil soup", "1 cup"),
                item("Whole grain bread", "1 slice"),
                item("Mixed green salad", "2 cups"),
            ],
        ),
        DietType::NonVeg => (
            vec![
                item("Eggs", "2 whole"),
                item("Whole grain toast", "1 slice"),
                item("Avocado", "1/2 medium"),
            ],
            vec![
                item("Grilled chicken breast", "4 oz"),
                item("Brown rice", "1/2 cup"),
                item("Steamed broccoli", "1 cup"),
            ],
            vec![
                item("Baked salmon", "4 oz"),
                item("Roasted sweet potato", "1 medium"),
                item("Asparagus", "1 cup"),
            ],
        ),
    };

    vec![
        meal("Breakfast", breakfast),
        meal("Lunch", lunch),
        meal("Dinner", dinner),
        meal(
            "Snacks",
            vec![
                item("Almonds", "1/4 cup"),
                item("Apple", "1 medium"),
                item("Carrot sticks", "1 cup"),
            ],
        ),
    ]
}

fn diabetic_breakfast() -> Vec<MealItem> {
    vec![
        item("Steel-cut oats", "1/2 cup"),
        item("Cinnamon", "1 teaspoon"),
        item("Chia seeds", "1 tablespoon"),
    ]
}

fn condition_recommendations(tag: ConditionTag) -> &'static [&'static str] {
    match tag {
        ConditionTag::Diabetes => &[
            "Monitor blood glucose levels regularly",
            "Eat smaller meals throughout the day to maintain steady glucose levels",
            "Prioritize low glycemic index foods",
            "Limit refined carbohydrates and added sugars",
        ],
        ConditionTag::Hypertension => &[
            "Limit sodium intake to less than 2,300mg per day",
            "Increase potassium-rich foods like bananas and leafy greens",
            "Consider the DASH diet approach",
            "Limit alcohol consumption",
        ],
        ConditionTag::HeartDisease => &[
            "Focus on heart-healthy omega-3 fatty acids",
            "Reduce saturated and trans fats",
            "Increase fiber intake to help lower cholesterol",
            "Consider adding soluble fiber from oats and barley",
        ],
        ConditionTag::WeightManagement => &[
            "Create a moderate calorie deficit of 500 calories per day",
            "Prioritize protein to maintain muscle mass",
            "Drink water before meals to increase fullness",
            "Track food intake with a journal or app",
        ],
        ConditionTag::DailyFitness => &[],
    }
}

fn condition_plan(diet_type: DietType, conditions: &BTreeSet<ConditionTag>) -> PlanContent {
    let mut plan = PlanContent {
        meals: base_meals(diet_type),
        ..PlanContent::default()
    };

    // BTreeSet iterates in declaration order, which is the rule priority.
    for &tag in conditions {
        if tag == ConditionTag::Diabetes {
            if let Some(breakfast) = plan.meals.iter_mut().find(|m| m.name == "Breakfast") {
                breakfast.items = diabetic_breakfast();
            }
        }
        if tag == ConditionTag::WeightManagement && plan.exercises.is_empty() {
            plan.exercises = vec![
                exercise("High-intensity interval training", "20 minutes", "3 times per week"),
                exercise("Strength training", "30 minutes", "2-3 times per week"),
            ];
        }
        plan.recommendations
            .extend(strings(condition_recommendations(tag)));
    }

    if plan.exercises.is_empty() {
        plan.exercises = vec![
            exercise("Walking", "30 minutes", "Daily"),
            exercise("Light stretching", "15 minutes", "Daily"),
        ];
    }
    plan
}

/// Build a plan from a diet type and a set of condition tags.
pub fn generate(diet_type: DietType, conditions: &BTreeSet<ConditionTag>) -> PlanContent {
    if conditions.contains(&ConditionTag::DailyFitness) {
        fitness_plan(diet_type)
    } else {
        condition_plan(diet_type, conditions)
    }
}

/// Parse free-form tags: unknown tags are dropped, duplicates collapse.
pub fn parse_conditions<S: AsRef<str>>(raw: &[S]) -> BTreeSet<ConditionTag> {
    raw.iter()
        .filter_map(|s| ConditionTag::from_str(s.as_ref().trim()).ok())
        .collect()
}

// ═══════════════════════════════════════════
// Persistence
// ═══════════════════════════════════════════

/// Generate a plan for `patient` and store it, replacing any previous plan.
pub fn generate_and_save<S: AsRef<str>>(
    store: &dyn CareStore,
    patient: &User,
    diet_type: &str,
    conditions: &[S],
) -> Result<DietPlan, CoreError> {
    if patient.role != UserRole::Patient {
        return Err(CoreError::Forbidden("diet plans are generated for patients".into()));
    }
    let diet_type = DietType::from_input(diet_type);
    let conditions = parse_conditions(conditions);

    let plan = DietPlan {
        id: Uuid::new_v4(),
        patient_id: patient.id,
        diet_type,
        content: generate(diet_type, &conditions),
        conditions: conditions.into_iter().collect(),
        created_at: timestamp_now(),
    };
    store.save_diet_plan(&plan)?;
    tracing::info!(plan_id = %plan.id, diet_type = %diet_type, "Diet plan saved");
    Ok(plan)
}

/// The patient's current plan. Readable by the patient and connected doctors.
pub fn latest_plan(
    store: &dyn CareStore,
    viewer: &User,
    patient_id: &Uuid,
) -> Result<DietPlan, CoreError> {
    if viewer.id != *patient_id && !store.are_connected(&viewer.id, patient_id)? {
        return Err(CoreError::Forbidden("access denied".into()));
    }
    store
        .get_diet_plan(patient_id)?
        .ok_or_else(|| CoreError::NotFound(format!("diet plan for {patient_id}")))
}
