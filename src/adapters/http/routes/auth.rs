use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::{app_state::AppState, extract::ActiveUser},
    app_error::AppResult,
    domain::entities::user::{
        ActivityLevel, DietaryPreference, FitnessGoal, Gender, UserProfile,
    },
    use_cases::user::{AccessToken, ProfileUpdate, Registration},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me).put(update_me))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
struct RegisterPayload {
    email: String,
    username: String,
    password: String,
    first_name: Option<String>,
    last_name: Option<String>,
}

#[derive(Deserialize)]
struct LoginPayload {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    id: String,
    email: String,
    username: String,
    first_name: Option<String>,
    last_name: Option<String>,
    age: Option<i32>,
    weight: Option<f64>,
    height: Option<f64>,
    gender: Option<Gender>,
    activity_level: Option<ActivityLevel>,
    fitness_goal: Option<FitnessGoal>,
    dietary_preferences: Vec<DietaryPreference>,
    allergies: Vec<String>,
    disliked_foods: Vec<String>,
    preferred_cuisines: Vec<String>,
    created_at: DateTime<Utc>,
    is_active: bool,
}

impl From<UserProfile> for UserResponse {
    fn from(p: UserProfile) -> Self {
        Self {
            id: p.id,
            email: p.email,
            username: p.username,
            first_name: p.first_name,
            last_name: p.last_name,
            age: p.age,
            weight: p.weight,
            height: p.height,
            gender: p.gender,
            activity_level: p.activity_level,
            fitness_goal: p.fitness_goal,
            dietary_preferences: p.dietary_preferences,
            allergies: p.allergies,
            disliked_foods: p.disliked_foods,
            preferred_cuisines: p.preferred_cuisines,
            created_at: p.created_at,
            is_active: p.is_active,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/register
async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> AppResult<impl IntoResponse> {
    let profile = app_state
        .auth_use_cases
        .register(Registration {
            email: payload.email,
            username: payload.username,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(profile))))
}

/// POST /api/auth/login
async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> AppResult<Json<AccessToken>> {
    let token = app_state
        .auth_use_cases
        .login(&payload.email, &payload.password)
        .await?;
    Ok(Json(token))
}

/// GET /api/auth/me
async fn me(ActiveUser(identity): ActiveUser) -> Json<UserResponse> {
    Json(identity.into_profile().into())
}

/// PUT /api/auth/me
async fn update_me(
    State(app_state): State<AppState>,
    ActiveUser(identity): ActiveUser,
    Json(update): Json<ProfileUpdate>,
) -> AppResult<Json<UserResponse>> {
    let profile = app_state
        .auth_use_cases
        .update_profile(identity, update)
        .await?;
    Ok(Json(profile.into()))
}
