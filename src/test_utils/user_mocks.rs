//! In-memory user store and rate limiter.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::user::{UserId, UserProfile},
    infra::RateLimiterTrait,
    use_cases::{
        identity::UserLookup,
        user::{NewUser, ProfileUpdate, UserCredentials, UserRepo},
    },
};

// ============================================================================
// InMemoryUserRepo
// ============================================================================

struct StoredUser {
    profile: UserProfile,
    password_hash: Option<String>,
}

/// User store keyed by id. Users added with `with_users` have no password until
/// `set_password_hash` is called, like rows replicated from the peer service.
#[derive(Default)]
pub struct InMemoryUserRepo {
    users: Mutex<HashMap<String, StoredUser>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<UserProfile>) -> Self {
        let map = users
            .into_iter()
            .map(|profile| {
                (
                    profile.id.clone(),
                    StoredUser {
                        profile,
                        password_hash: None,
                    },
                )
            })
            .collect();
        Self {
            users: Mutex::new(map),
        }
    }

    pub fn set_password_hash(&self, id: &str, hash: &str) {
        if let Some(user) = self.users.lock().unwrap().get_mut(id) {
            user.password_hash = Some(hash.to_string());
        }
    }

    pub fn password_hash_of(&self, id: &str) -> Option<String> {
        self.users
            .lock()
            .unwrap()
            .get(id)
            .and_then(|u| u.password_hash.clone())
    }

    pub fn profile(&self, id: &str) -> Option<UserProfile> {
        self.users.lock().unwrap().get(id).map(|u| u.profile.clone())
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserLookup for InMemoryUserRepo {
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<UserProfile>> {
        Ok(self.profile(id.as_str()))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserProfile>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.profile.email == email)
            .map(|u| u.profile.clone()))
    }
}

#[async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn find_credentials_by_email(&self, email: &str) -> AppResult<Option<UserCredentials>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .values()
            .find(|u| u.profile.email == email)
            .and_then(|u| {
                u.password_hash.clone().map(|password_hash| UserCredentials {
                    profile: u.profile.clone(),
                    password_hash,
                })
            }))
    }

    async fn email_or_username_taken(&self, email: &str, username: &str) -> AppResult<bool> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .any(|u| u.profile.email == email || u.profile.username == username))
    }

    async fn insert(&self, user: NewUser) -> AppResult<UserProfile> {
        let now = Utc::now();
        let profile = UserProfile {
            id: user.id.to_string(),
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            age: None,
            weight: None,
            height: None,
            gender: None,
            activity_level: None,
            fitness_goal: None,
            dietary_preferences: Vec::new(),
            allergies: Vec::new(),
            disliked_foods: Vec::new(),
            preferred_cuisines: Vec::new(),
            created_at: now,
            updated_at: now,
            last_login: None,
            is_active: true,
            is_verified: false,
        };
        self.users.lock().unwrap().insert(
            profile.id.clone(),
            StoredUser {
                profile: profile.clone(),
                password_hash: Some(user.password_hash),
            },
        );
        Ok(profile)
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> AppResult<Option<UserProfile>> {
        let mut users = self.users.lock().unwrap();
        let Some(stored) = users.get_mut(id.as_str()) else {
            return Ok(None);
        };
        let p = &mut stored.profile;
        let u = update.clone();
        if u.first_name.is_some() {
            p.first_name = u.first_name;
        }
        if u.last_name.is_some() {
            p.last_name = u.last_name;
        }
        if u.age.is_some() {
            p.age = u.age;
        }
        if u.weight.is_some() {
            p.weight = u.weight;
        }
        if u.height.is_some() {
            p.height = u.height;
        }
        if u.gender.is_some() {
            p.gender = u.gender;
        }
        if u.activity_level.is_some() {
            p.activity_level = u.activity_level;
        }
        if u.fitness_goal.is_some() {
            p.fitness_goal = u.fitness_goal;
        }
        if let Some(v) = u.dietary_preferences {
            p.dietary_preferences = v;
        }
        if let Some(v) = u.allergies {
            p.allergies = v;
        }
        if let Some(v) = u.disliked_foods {
            p.disliked_foods = v;
        }
        if let Some(v) = u.preferred_cuisines {
            p.preferred_cuisines = v;
        }
        p.updated_at = Utc::now();
        Ok(Some(p.clone()))
    }

    async fn record_login(&self, id: &UserId) -> AppResult<()> {
        if let Some(stored) = self.users.lock().unwrap().get_mut(id.as_str()) {
            stored.profile.last_login = Some(Utc::now());
        }
        Ok(())
    }
}

// ============================================================================
// FailingUserRepo
// ============================================================================

/// Store whose every call fails, for outage paths.
pub struct FailingUserRepo;

fn outage<T>() -> AppResult<T> {
    Err(AppError::Database("connection refused".into()))
}

#[async_trait]
impl UserLookup for FailingUserRepo {
    async fn find_by_id(&self, _id: &UserId) -> AppResult<Option<UserProfile>> {
        outage()
    }

    async fn find_by_email(&self, _email: &str) -> AppResult<Option<UserProfile>> {
        outage()
    }
}

#[async_trait]
impl UserRepo for FailingUserRepo {
    async fn find_credentials_by_email(&self, _email: &str) -> AppResult<Option<UserCredentials>> {
        outage()
    }

    async fn email_or_username_taken(&self, _email: &str, _username: &str) -> AppResult<bool> {
        outage()
    }

    async fn insert(&self, _user: NewUser) -> AppResult<UserProfile> {
        outage()
    }

    async fn update_profile(
        &self,
        _id: &UserId,
        _update: &ProfileUpdate,
    ) -> AppResult<Option<UserProfile>> {
        outage()
    }

    async fn record_login(&self, _id: &UserId) -> AppResult<()> {
        outage()
    }
}

// ============================================================================
// InMemoryRateLimiter
// ============================================================================

pub struct InMemoryRateLimiter {
    counts: Mutex<HashMap<String, u64>>,
    max_per_ip: u64,
}

impl InMemoryRateLimiter {
    pub fn new(max_per_ip: u64) -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
            max_per_ip,
        }
    }

    /// Create a permissive rate limiter that never blocks (for most tests).
    pub fn permissive() -> Self {
        Self::new(u64::MAX)
    }
}

#[async_trait]
impl RateLimiterTrait for InMemoryRateLimiter {
    async fn check(&self, ip: &str) -> AppResult<()> {
        let mut counts = self.counts.lock().unwrap();
        let count = counts.entry(format!("rate:ip:{ip}")).or_insert(0);
        *count += 1;
        if *count > self.max_per_ip {
            return Err(AppError::RateLimited);
        }
        Ok(())
    }
}
