use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::hex_id;

/// Identifier of a persisted user.
///
/// Both backends share one user namespace, so ids use the same 24-hex-character
/// shape the peer service hands out in its `userId` claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Accepts only well-formed ids. Case is normalized to lowercase.
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

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    ExtremelyActive,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FitnessGoal {
    WeightLoss,
    MuscleGain,
    Maintenance,
    Endurance,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DietaryPreference {
    Vegetarian,
    Vegan,
    Keto,
    Paleo,
    Mediterranean,
    GlutenFree,
    DairyFree,
    None,
}

/// User record as seen by handlers, independent of where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_verified: bool,
}

/// Authenticated identity attached to a request.
///
/// `Synthesized` identities are built from token claims when the local store has
/// no matching row. They live for one request and must never be written back.
#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
    Persisted(UserProfile),
    Synthesized(UserProfile),
}

impl Identity {
    pub fn profile(&self) -> &UserProfile {
        match self {
            Identity::Persisted(profile) | Identity::Synthesized(profile) => profile,
        }
    }

    pub fn into_profile(self) -> UserProfile {
        match self {
            Identity::Persisted(profile) | Identity::Synthesized(profile) => profile,
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, Identity::Persisted(_))
    }

    /// Store id of a persisted identity. `None` for synthesized ones.
    pub fn persisted_id(&self) -> Option<UserId> {
        match self {
            Identity::Persisted(profile) => UserId::parse(&profile.id),
            Identity::Synthesized(_) => None,
        }
    }
}
