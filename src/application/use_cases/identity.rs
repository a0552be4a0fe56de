use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::instrument;

use crate::{
    app_error::{AppError, AppResult},
    application::jwt::NormalizedClaims,
    domain::entities::user::{ActivityLevel, Gender, Identity, UserId, UserProfile},
};

/// Stand-in id when a token carries no subject id.
pub const SYNTHESIZED_USER_ID: &str = "temp_user_id";
pub const SYNTHESIZED_EMAIL: &str = "unknown@example.com";
pub const SYNTHESIZED_USERNAME: &str = "User";
pub const DEFAULT_AGE: i32 = 25;
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;
pub const DEFAULT_HEIGHT_CM: f64 = 170.0;

/// Read-only view of the user store.
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<UserProfile>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserProfile>>;
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("could not derive a username for a synthesized identity")]
    Synthesis,
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Maps verified token claims to a user.
#[derive(Clone)]
pub struct IdentityUseCases {
    users: Arc<dyn UserLookup>,
}

impl IdentityUseCases {
    pub fn new(users: Arc<dyn UserLookup>) -> Self {
        Self { users }
    }

    /// Look the user up by id, then by email, and synthesize one from the claims
    /// if the store has neither. Store failures count as misses.
    #[instrument(skip_all, fields(format = ?claims.format))]
    pub async fn resolve(&self, claims: &NormalizedClaims) -> Result<Identity, IdentityError> {
        if let Some(id) = claims.subject_id.as_deref().and_then(UserId::parse)
            && let Some(profile) = self.lookup_by_id(&id).await
        {
            tracing::debug!("Resolved persisted user by id");
            return Ok(Identity::Persisted(profile));
        }

        if let Some(email) = claims.email.as_deref()
            && let Some(profile) = self.lookup_by_email(email).await
        {
            tracing::debug!("Resolved persisted user by email");
            return Ok(Identity::Persisted(profile));
        }

        tracing::info!("No local user for verified token, using synthesized identity");
        synthesize_identity(claims, Utc::now()).map(Identity::Synthesized)
    }

    async fn lookup_by_id(&self, id: &UserId) -> Option<UserProfile> {
        match self.users.find_by_id(id).await {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(error = %err, "User lookup by id failed, treating as not found");
                None
            }
        }
    }

    async fn lookup_by_email(&self, email: &str) -> Option<UserProfile> {
        match self.users.find_by_email(email).await {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(error = %err, "User lookup by email failed, treating as not found");
                None
            }
        }
    }
}

/// Build a request-scoped profile from claim data and fixed defaults.
pub fn synthesize_identity(
    claims: &NormalizedClaims,
    now: DateTime<Utc>,
) -> Result<UserProfile, IdentityError> {
    let username = derive_username(claims);
    if username.trim().is_empty() {
        return Err(IdentityError::Synthesis);
    }

    Ok(UserProfile {
        id: claims
            .subject_id
            .clone()
            .unwrap_or_else(|| SYNTHESIZED_USER_ID.to_string()),
        email: claims
            .email
            .clone()
            .unwrap_or_else(|| SYNTHESIZED_EMAIL.to_string()),
        first_name: Some(username.clone()),
        last_name: Some(String::new()),
        username,
        age: Some(DEFAULT_AGE),
        weight: Some(DEFAULT_WEIGHT_KG),
        height: Some(DEFAULT_HEIGHT_CM),
        gender: Some(Gender::Other),
        activity_level: Some(ActivityLevel::ModeratelyActive),
        fitness_goal: None,
        dietary_preferences: Vec::new(),
        allergies: Vec::new(),
        disliked_foods: Vec::new(),
        preferred_cuisines: Vec::new(),
        created_at: now,
        updated_at: now,
        last_login: None,
        is_active: true,
        is_verified: true,
    })
}

/// Non-blank `username` claim, else the email local-part, else "User".
fn derive_username(claims: &NormalizedClaims) -> String {
    if let Some(username) = claims
        .raw
        .get("username")
        .and_then(|v| v.as_str())
        .filter(|u| !u.trim().is_empty())
    {
        return username.to_string();
    }
    match claims.email.as_deref() {
        Some(email) => email.split('@').next().unwrap_or_default().to_string(),
        None => SYNTHESIZED_USERNAME.to_string(),
    }
}

/// Second-stage gate for protected routes.
pub fn require_active(identity: Identity) -> AppResult<Identity> {
    if !identity.profile().is_active {
        return Err(AppError::InactiveAccount);
    }
    Ok(identity)
}
