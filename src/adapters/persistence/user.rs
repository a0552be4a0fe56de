use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{parse_enum_list_with_fallback, parse_enum_with_fallback};
use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::AppResult,
    domain::entities::user::{UserId, UserProfile},
    use_cases::{
        identity::UserLookup,
        user::{NewUser, ProfileUpdate, UserCredentials, UserRepo},
    },
};

const SELECT_USER: &str = r#"
    SELECT id, email, username, password_hash, first_name, last_name, age, weight, height,
           gender, activity_level, fitness_goal, dietary_preferences, allergies,
           disliked_foods, preferred_cuisines, created_at, updated_at, last_login,
           is_active, is_verified
    FROM users
"#;

const USER_COLUMNS: &str = r#"
    id, email, username, password_hash, first_name, last_name, age, weight, height,
    gender, activity_level, fitness_goal, dietary_preferences, allergies,
    disliked_foods, preferred_cuisines, created_at, updated_at, last_login,
    is_active, is_verified
"#;

// User row as stored in the db. Most columns are nullable because rows may be
// replicated from the peer service with only a few fields filled in.
#[derive(sqlx::FromRow, Debug)]
pub struct UserDb {
    pub id: String,
    pub email: String,
    pub username: String,
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub gender: Option<String>,
    pub activity_level: Option<String>,
    pub fitness_goal: Option<String>,
    pub dietary_preferences: Option<Vec<String>>,
    pub allergies: Option<Vec<String>>,
    pub disliked_foods: Option<Vec<String>>,
    pub preferred_cuisines: Option<Vec<String>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
}

impl UserDb {
    fn into_credentials(self) -> Option<UserCredentials> {
        let password_hash = self.password_hash.clone()?;
        Some(UserCredentials {
            profile: self.into(),
            password_hash,
        })
    }
}

impl From<UserDb> for UserProfile {
    fn from(row: UserDb) -> Self {
        let now = Utc::now();
        UserProfile {
            gender: parse_enum_with_fallback(row.gender.as_deref(), "gender", &row.id),
            activity_level: parse_enum_with_fallback(
                row.activity_level.as_deref(),
                "activity_level",
                &row.id,
            ),
            fitness_goal: parse_enum_with_fallback(
                row.fitness_goal.as_deref(),
                "fitness_goal",
                &row.id,
            ),
            dietary_preferences: parse_enum_list_with_fallback(
                row.dietary_preferences,
                "dietary_preferences",
                &row.id,
            ),
            allergies: row.allergies.unwrap_or_default(),
            disliked_foods: row.disliked_foods.unwrap_or_default(),
            preferred_cuisines: row.preferred_cuisines.unwrap_or_default(),
            created_at: row.created_at.unwrap_or(now),
            updated_at: row.updated_at.unwrap_or(now),
            last_login: row.last_login,
            is_active: row.is_active.unwrap_or(true),
            is_verified: row.is_verified.unwrap_or(false),
            id: row.id,
            email: row.email,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            age: row.age,
            weight: row.weight,
            height: row.height,
        }
    }
}

#[async_trait]
impl UserLookup for PostgresPersistence {
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<UserProfile>> {
        let rec = sqlx::query_as::<_, UserDb>(&format!("{SELECT_USER} WHERE id = $1"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(rec.map(UserProfile::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserProfile>> {
        let rec = sqlx::query_as::<_, UserDb>(&format!("{SELECT_USER} WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rec.map(UserProfile::from))
    }
}

#[async_trait]
impl UserRepo for PostgresPersistence {
    async fn find_credentials_by_email(&self, email: &str) -> AppResult<Option<UserCredentials>> {
        let rec = sqlx::query_as::<_, UserDb>(&format!("{SELECT_USER} WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rec.and_then(UserDb::into_credentials))
    }

    async fn email_or_username_taken(&self, email: &str, username: &str) -> AppResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 OR username = $2)",
        )
        .bind(email)
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn insert(&self, user: NewUser) -> AppResult<UserProfile> {
        let rec = sqlx::query_as::<_, UserDb>(&format!(
            r#"INSERT INTO users (id, email, username, password_hash, first_name, last_name,
                                  dietary_preferences, allergies, disliked_foods,
                                  preferred_cuisines, created_at, updated_at,
                                  is_active, is_verified)
               VALUES ($1, $2, $3, $4, $5, $6, '{{}}', '{{}}', '{{}}', '{{}}', NOW(), NOW(),
                       TRUE, FALSE)
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(user.id.as_str())
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(rec.into())
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> AppResult<Option<UserProfile>> {
        let dietary_preferences: Option<Vec<String>> = update
            .dietary_preferences
            .as_ref()
            .map(|prefs| prefs.iter().map(|p| p.to_string()).collect());

        let rec = sqlx::query_as::<_, UserDb>(&format!(
            r#"UPDATE users SET
                   first_name = COALESCE($2, first_name),
                   last_name = COALESCE($3, last_name),
                   age = COALESCE($4, age),
                   weight = COALESCE($5, weight),
                   height = COALESCE($6, height),
                   gender = COALESCE($7, gender),
                   activity_level = COALESCE($8, activity_level),
                   fitness_goal = COALESCE($9, fitness_goal),
                   dietary_preferences = COALESCE($10, dietary_preferences),
                   allergies = COALESCE($11, allergies),
                   disliked_foods = COALESCE($12, disliked_foods),
                   preferred_cuisines = COALESCE($13, preferred_cuisines),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(id.as_str())
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(update.age)
        .bind(update.weight)
        .bind(update.height)
        .bind(update.gender.map(|g| g.to_string()))
        .bind(update.activity_level.map(|a| a.to_string()))
        .bind(update.fitness_goal.map(|f| f.to_string()))
        .bind(dietary_preferences)
        .bind(&update.allergies)
        .bind(&update.disliked_foods)
        .bind(&update.preferred_cuisines)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rec.map(UserProfile::from))
    }

    async fn record_login(&self, id: &UserId) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
