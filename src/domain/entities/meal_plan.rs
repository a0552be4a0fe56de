use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::hex_id;
use super::user::{ActivityLevel, DietaryPreference, FitnessGoal, Gender, UserProfile};

/// Identifier of a stored meal plan. Same 24-hex shape as user ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MealPlanId(String);

impl MealPlanId {
    pub fn parse(raw: &str) -> Option<Self> {
        hex_id::parse(raw).map(Self)
    }

    pub fn generate() -> Self {
        Self(hex_id::generate())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MealPlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Meals
// ============================================================================

/// Nutrient amounts for one meal or ingredient. Missing fields read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutritionInfo {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub sodium: f64,
    pub cholesterol: f64,
    pub saturated_fat: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub name: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    /// Minutes.
    pub prep_time: u32,
    #[serde(default)]
    pub nutrition: Option<NutritionInfo>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub cuisine_type: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub portion_size: Option<String>,
}

/// One day of meals plus macro totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayMealPlan {
    pub breakfast: Option<Meal>,
    pub lunch: Option<Meal>,
    pub dinner: Option<Meal>,
    pub snack: Option<Meal>,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
}

impl DayMealPlan {
    pub fn meals(&self) -> impl Iterator<Item = &Meal> {
        [&self.breakfast, &self.lunch, &self.dinner, &self.snack]
            .into_iter()
            .flatten()
    }

    /// Recompute the totals from the meals' nutrition. Meals without nutrition
    /// count as zero.
    pub fn with_totals(mut self) -> Self {
        let (calories, protein, carbs, fat) = self
            .meals()
            .filter_map(|meal| meal.nutrition.as_ref())
            .fold((0.0, 0.0, 0.0, 0.0), |acc, n| {
                (
                    acc.0 + n.calories,
                    acc.1 + n.protein,
                    acc.2 + n.carbs,
                    acc.3 + n.fat,
                )
            });
        self.total_calories = calories;
        self.total_protein = protein;
        self.total_carbs = carbs;
        self.total_fat = fat;
        self
    }
}

/// A stored plan. `user_id` is the owner the plan is scoped to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealPlan {
    pub id: MealPlanId,
    pub user_id: String,
    pub meals: DayMealPlan,
    pub created_at: DateTime<Utc>,
    pub preferences: Map<String, Value>,
}

// ============================================================================
// Generation Requests
// ============================================================================

/// Body facts the generator plans around. Sent by the client on `/generate`,
/// rebuilt from the stored profile on regenerate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DietProfile {
    pub age: Option<i32>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub gender: Option<Gender>,
    pub activity_level: Option<ActivityLevel>,
    pub fitness_goal: Option<FitnessGoal>,
    pub dietary_preferences: Vec<DietaryPreference>,
    pub allergies: Vec<String>,
    pub disliked_foods: Vec<String>,
    pub preferred_cuisines: Vec<String>,
}

impl DietProfile {
    pub const DEFAULT_AGE: i32 = 30;
    pub const DEFAULT_WEIGHT_KG: f64 = 70.0;
    pub const DEFAULT_HEIGHT_CM: f64 = 170.0;

    /// Profile for regenerating a plan: stored values, with defaults filling
    /// every unset body fact.
    pub fn from_user(user: &UserProfile) -> Self {
        Self {
            age: Some(user.age.unwrap_or(Self::DEFAULT_AGE)),
            weight: Some(user.weight.unwrap_or(Self::DEFAULT_WEIGHT_KG)),
            height: Some(user.height.unwrap_or(Self::DEFAULT_HEIGHT_CM)),
            gender: Some(user.gender.unwrap_or(Gender::Other)),
            activity_level: Some(user.activity_level.unwrap_or(ActivityLevel::ModeratelyActive)),
            fitness_goal: Some(user.fitness_goal.unwrap_or(FitnessGoal::Maintenance)),
            dietary_preferences: user.dietary_preferences.clone(),
            allergies: user.allergies.clone(),
            disliked_foods: user.disliked_foods.clone(),
            preferred_cuisines: user.preferred_cuisines.clone(),
        }
    }
}

fn default_budget_range() -> String {
    "medium".to_string()
}

fn default_cooking_skill() -> String {
    "intermediate".to_string()
}

fn default_meal_focus() -> String {
    "balanced".to_string()
}

fn default_max_prep_time() -> u32 {
    30
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanRequest {
    pub user_profile: DietProfile,
    /// low, medium or high.
    #[serde(default = "default_budget_range")]
    pub budget_range: String,
    /// beginner, intermediate or advanced.
    #[serde(default = "default_cooking_skill")]
    pub cooking_skill: String,
    #[serde(default = "default_meal_focus")]
    pub meal_focus: String,
    /// Minutes.
    #[serde(default = "default_max_prep_time")]
    pub max_prep_time: u32,
    /// Replace every stored plan of the owner with the new one.
    #[serde(default)]
    pub regenerate: bool,
}

impl MealPlanRequest {
    pub fn for_profile(user_profile: DietProfile) -> Self {
        Self {
            user_profile,
            budget_range: default_budget_range(),
            cooking_skill: default_cooking_skill(),
            meal_focus: default_meal_focus(),
            max_prep_time: default_max_prep_time(),
            regenerate: false,
        }
    }

    /// Options stored with the plan.
    pub fn preferences(&self) -> Map<String, Value> {
        let mut preferences = Map::new();
        preferences.insert("budget_range".into(), json!(self.budget_range));
        preferences.insert("cooking_skill".into(), json!(self.cooking_skill));
        preferences.insert("meal_focus".into(), json!(self.meal_focus));
        preferences.insert("max_prep_time".into(), json!(self.max_prep_time));
        preferences
    }
}
