use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        jwt::{self, JwtConfig},
        password::{hash_password_blocking, verify_password_blocking},
        use_cases::identity::UserLookup,
        validators::{check_name, check_password, check_range, is_valid_email, is_valid_username},
    },
    domain::entities::user::{
        ActivityLevel, DietaryPreference, FitnessGoal, Gender, Identity, UserId, UserProfile,
    },
};

/// Full user store, including the write paths used by account routes.
#[async_trait]
pub trait UserRepo: UserLookup {
    async fn find_credentials_by_email(&self, email: &str) -> AppResult<Option<UserCredentials>>;
    async fn email_or_username_taken(&self, email: &str, username: &str) -> AppResult<bool>;
    async fn insert(&self, user: NewUser) -> AppResult<UserProfile>;
    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> AppResult<Option<UserProfile>>;
    async fn record_login(&self, id: &UserId) -> AppResult<()>;
}

#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub profile: UserProfile,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Partial profile change. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub gender: Option<Gender>,
    pub activity_level: Option<ActivityLevel>,
    pub fitness_goal: Option<FitnessGoal>,
    pub dietary_preferences: Option<Vec<DietaryPreference>>,
    pub allergies: Option<Vec<String>>,
    pub disliked_foods: Option<Vec<String>>,
    pub preferred_cuisines: Option<Vec<String>>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.age.is_none()
            && self.weight.is_none()
            && self.height.is_none()
            && self.gender.is_none()
            && self.activity_level.is_none()
            && self.fitness_goal.is_none()
            && self.dietary_preferences.is_none()
            && self.allergies.is_none()
            && self.disliked_foods.is_none()
            && self.preferred_cuisines.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        check_name("first_name", self.first_name.as_deref())?;
        check_name("last_name", self.last_name.as_deref())?;
        check_range("age", self.age, 1, 120)?;
        check_range("weight", self.weight, 20.0, 300.0)?;
        check_range("height", self.height, 50.0, 250.0)?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
}

#[derive(Clone)]
pub struct AuthUseCases {
    repo: Arc<dyn UserRepo>,
    jwt: Arc<JwtConfig>,
    bcrypt_cost: u32,
}

impl AuthUseCases {
    pub fn new(repo: Arc<dyn UserRepo>, jwt: Arc<JwtConfig>, bcrypt_cost: u32) -> Self {
        Self {
            repo,
            jwt,
            bcrypt_cost,
        }
    }

    #[instrument(skip_all)]
    pub async fn register(&self, registration: Registration) -> AppResult<UserProfile> {
        let email = registration.email.trim().to_string();
        let username = registration.username.trim().to_string();

        if !is_valid_email(&email) {
            return Err(AppError::InvalidInput("Invalid email address".into()));
        }
        if !is_valid_username(&username) {
            return Err(AppError::InvalidInput(
                "Username must be between 3 and 50 characters".into(),
            ));
        }
        check_password(&registration.password).map_err(AppError::InvalidInput)?;
        check_name("first_name", registration.first_name.as_deref())
            .map_err(AppError::InvalidInput)?;
        check_name("last_name", registration.last_name.as_deref())
            .map_err(AppError::InvalidInput)?;

        if self.repo.email_or_username_taken(&email, &username).await? {
            return Err(AppError::InvalidInput(
                "User with this email or username already exists".into(),
            ));
        }

        let password_hash = hash_password_blocking(registration.password, self.bcrypt_cost).await?;

        let profile = self
            .repo
            .insert(NewUser {
                id: UserId::generate(),
                email,
                username,
                password_hash,
                first_name: registration.first_name,
                last_name: registration.last_name,
            })
            .await?;

        tracing::info!(user_id = %profile.id, "Registered new user");
        Ok(profile)
    }

    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AccessToken> {
        let Some(credentials) = self.repo.find_credentials_by_email(email.trim()).await? else {
            return Err(AppError::InvalidCredentials);
        };

        let matches =
            verify_password_blocking(password.to_string(), credentials.password_hash).await?;
        if !matches {
            return Err(AppError::InvalidCredentials);
        }

        let profile = credentials.profile;
        if !profile.is_active {
            return Err(AppError::AccountDeactivated);
        }

        if let Some(id) = UserId::parse(&profile.id) {
            self.repo.record_login(&id).await?;
        }

        let access_token = jwt::issue_access_token(&profile.email, &self.jwt)?;
        Ok(AccessToken {
            access_token,
            token_type: "bearer",
        })
    }

    /// Apply a profile change for the caller. Synthesized identities have no row
    /// to update and are refused.
    #[instrument(skip_all)]
    pub async fn update_profile(
        &self,
        identity: Identity,
        update: ProfileUpdate,
    ) -> AppResult<UserProfile> {
        let Some(id) = identity.persisted_id() else {
            return Err(AppError::InvalidInput(
                "Profile is not registered with this service".into(),
            ));
        };

        update.validate().map_err(AppError::InvalidInput)?;

        if update.is_empty() {
            return Ok(identity.into_profile());
        }

        self.repo
            .update_profile(&id, &update)
            .await?
            .ok_or(AppError::NotFound)
    }
}
