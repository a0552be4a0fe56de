use std::collections::BTreeMap;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::{
    adapters::http::{app_state::AppState, extract::ActiveUser},
    app_error::AppResult,
    domain::entities::meal_plan::{MealPlan, MealPlanRequest, NutritionInfo},
    use_cases::meal_plan::{NutritionQuery, Page},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_plans))
        .route("/generate", post(generate))
        .route("/nutrition/analyze", post(analyze_nutrition))
        .route("/regenerate/{plan_id}", post(regenerate))
        .route("/{plan_id}", get(get_plan).delete(delete_plan))
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
struct MealPlanResponse {
    success: bool,
    message: &'static str,
    data: MealPlan,
}

#[derive(Serialize)]
struct NutritionResponse {
    success: bool,
    message: &'static str,
    nutrition_data: BTreeMap<String, Option<NutritionInfo>>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/mealplan/generate
async fn generate(
    State(app_state): State<AppState>,
    ActiveUser(identity): ActiveUser,
    Json(request): Json<MealPlanRequest>,
) -> AppResult<Json<MealPlanResponse>> {
    let plan = app_state
        .meal_plan_use_cases
        .generate(&identity, request)
        .await?;
    Ok(Json(MealPlanResponse {
        success: true,
        message: "Meal plan generated successfully",
        data: plan,
    }))
}

/// GET /api/mealplan?limit=&skip=
async fn list_plans(
    State(app_state): State<AppState>,
    ActiveUser(identity): ActiveUser,
    Query(page): Query<Page>,
) -> AppResult<Json<Vec<MealPlan>>> {
    let plans = app_state.meal_plan_use_cases.list(&identity, &page).await?;
    Ok(Json(plans))
}

/// GET /api/mealplan/{plan_id}
async fn get_plan(
    State(app_state): State<AppState>,
    ActiveUser(identity): ActiveUser,
    Path(plan_id): Path<String>,
) -> AppResult<Json<MealPlan>> {
    let plan = app_state.meal_plan_use_cases.get(&identity, &plan_id).await?;
    Ok(Json(plan))
}

/// DELETE /api/mealplan/{plan_id}
async fn delete_plan(
    State(app_state): State<AppState>,
    ActiveUser(identity): ActiveUser,
    Path(plan_id): Path<String>,
) -> AppResult<Json<Value>> {
    app_state
        .meal_plan_use_cases
        .delete(&identity, &plan_id)
        .await?;
    Ok(Json(json!({ "message": "Meal plan deleted successfully" })))
}

/// POST /api/mealplan/regenerate/{plan_id}
async fn regenerate(
    State(app_state): State<AppState>,
    ActiveUser(identity): ActiveUser,
    Path(plan_id): Path<String>,
) -> AppResult<Json<MealPlanResponse>> {
    let plan = app_state
        .meal_plan_use_cases
        .regenerate(&identity, &plan_id)
        .await?;
    Ok(Json(MealPlanResponse {
        success: true,
        message: "Meal plan regenerated successfully",
        data: plan,
    }))
}

/// POST /api/mealplan/nutrition/analyze
async fn analyze_nutrition(
    State(app_state): State<AppState>,
    ActiveUser(_identity): ActiveUser,
    Json(query): Json<NutritionQuery>,
) -> AppResult<Json<NutritionResponse>> {
    let nutrition_data = app_state
        .meal_plan_use_cases
        .analyze_nutrition(&query)
        .await?;
    Ok(Json(NutritionResponse {
        success: true,
        message: "Nutrition analysis completed",
        nutrition_data,
    }))
}
