//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use secrecy::SecretString;
use serde_json::Value;

use crate::{
    application::jwt::{JwtConfig, PEER_AUDIENCE, PEER_ISSUER},
    domain::entities::{
        meal_plan::{DayMealPlan, Meal, NutritionInfo},
        user::{ActivityLevel, Gender, UserId, UserProfile},
    },
};

/// Secret used by `TestAppStateBuilder` and the HTTP tests.
pub const TEST_JWT_SECRET: &str = "test_jwt_secret_shared_with_peer";

static NEXT_USER: AtomicU64 = AtomicU64::new(1);

/// Create an active, registered test user with a fresh id, email and username.
pub fn create_test_user(overrides: impl FnOnce(&mut UserProfile)) -> UserProfile {
    let n = NEXT_USER.fetch_add(1, Ordering::Relaxed);
    let mut user = UserProfile {
        id: UserId::generate().to_string(),
        email: format!("test{n}@example.com"),
        username: format!("test_user_{n}"),
        first_name: Some("Test".to_string()),
        last_name: Some("User".to_string()),
        age: Some(30),
        weight: Some(75.0),
        height: Some(180.0),
        gender: Some(Gender::Other),
        activity_level: Some(ActivityLevel::LightlyActive),
        fitness_goal: None,
        dietary_preferences: Vec::new(),
        allergies: Vec::new(),
        disliked_foods: Vec::new(),
        preferred_cuisines: Vec::new(),
        created_at: test_datetime(),
        updated_at: test_datetime(),
        last_login: None,
        is_active: true,
        is_verified: false,
    };
    overrides(&mut user);
    user
}

/// Sign arbitrary claims with HS256.
pub fn encode_test_token(claims: &Value, secret: &str) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("test claims should encode")
}

/// Access token in the peer service's layout, signed with `TEST_JWT_SECRET`
/// and valid for an hour.
pub fn peer_access_token(user_id: &str, email: &str) -> String {
    let now = Utc::now().timestamp();
    encode_test_token(
        &serde_json::json!({
            "userId": user_id,
            "email": email,
            "type": "access",
            "iat": now,
            "exp": now + 3600,
            "iss": PEER_ISSUER,
            "aud": PEER_AUDIENCE,
        }),
        TEST_JWT_SECRET,
    )
}

pub fn test_jwt_config(secret: &str) -> JwtConfig {
    JwtConfig {
        secret: SecretString::new(secret.into()),
        algorithm: Algorithm::HS256,
        expire_minutes: 30,
    }
}

/// Fixed timestamp for reproducible fixtures.
pub fn test_datetime() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0)
        .single()
        .expect("fixed test datetime is valid")
}

/// Breakfast and dinner with nutrition, no lunch or snack. Totals are left at
/// zero so callers can check that they get recomputed.
pub fn sample_day_plan() -> DayMealPlan {
    let meal = |name: &str, calories: f64, protein: f64| Meal {
        name: name.to_string(),
        description: format!("{name} for testing"),
        ingredients: vec!["1 cup oats".to_string(), "200g salmon".to_string()],
        instructions: vec!["Cook.".to_string(), "Serve.".to_string()],
        prep_time: 15,
        nutrition: Some(NutritionInfo {
            calories,
            protein,
            carbs: 30.0,
            fat: 10.0,
            ..Default::default()
        }),
        image_url: None,
        cuisine_type: Some("mediterranean".to_string()),
        difficulty: Some("easy".to_string()),
        portion_size: None,
    };
    DayMealPlan {
        breakfast: Some(meal("Overnight oats", 350.0, 12.0)),
        dinner: Some(meal("Baked salmon", 550.0, 40.0)),
        ..Default::default()
    }
}
