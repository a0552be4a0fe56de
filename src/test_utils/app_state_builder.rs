//! Test app state builder for HTTP-level integration testing.
//!
//! `TestAppStateBuilder` creates an `AppState` backed by in-memory mocks, signed
//! with `TEST_JWT_SECRET`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;

use crate::{
    adapters::http::app_state::AppState,
    domain::entities::user::UserProfile,
    infra::{RateLimiterTrait, config::AppConfig},
    test_utils::{
        FailingUserRepo, InMemoryMealPlanRepo, InMemoryRateLimiter, InMemoryUserRepo,
        StubCoachClient, StubMealPlanGenerator, StubNutritionLookup, TEST_JWT_SECRET,
        test_jwt_config,
    },
    use_cases::{
        coach::{CoachClient, CoachUseCases},
        identity::{IdentityUseCases, UserLookup},
        meal_plan::{MealPlanGenerator, MealPlanRepo, MealPlanUseCases, NutritionLookup},
        user::{AuthUseCases, UserRepo},
    },
};

/// In-memory collaborators behind a built `AppState`, for assertions.
pub struct TestStores {
    pub users: Arc<InMemoryUserRepo>,
    pub meal_plans: Arc<InMemoryMealPlanRepo>,
    pub generator: Arc<StubMealPlanGenerator>,
    pub nutrition: Arc<StubNutritionLookup>,
    pub coach: Arc<StubCoachClient>,
}

/// Lowest cost bcrypt accepts; keeps register/login tests fast.
const TEST_BCRYPT_COST: u32 = 4;

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let user = create_test_user(|u| u.email = "a@b.com".to_string());
/// let app_state = TestAppStateBuilder::new().with_user(user).build();
/// ```
#[derive(Default)]
pub struct TestAppStateBuilder {
    users: Vec<UserProfile>,
    failing_store: bool,
    ai_unavailable: bool,
    max_per_ip: Option<u64>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: UserProfile) -> Self {
        self.users.push(user);
        self
    }

    /// Every store call fails with a database error.
    pub fn with_failing_store(mut self) -> Self {
        self.failing_store = true;
        self
    }

    /// Meal plan generation and coach replies fail with `ServiceUnavailable`.
    pub fn with_unavailable_ai(mut self) -> Self {
        self.ai_unavailable = true;
        self
    }

    pub fn with_rate_limit(mut self, max_per_ip: u64) -> Self {
        self.max_per_ip = Some(max_per_ip);
        self
    }

    pub fn build(self) -> AppState {
        self.build_with_stores().0
    }

    /// Build the state and also hand back the in-memory user store.
    /// With `with_failing_store` the returned store is detached and stays empty.
    pub fn build_with_repo(self) -> (AppState, Arc<InMemoryUserRepo>) {
        let (app_state, stores) = self.build_with_stores();
        (app_state, stores.users)
    }

    pub fn build_with_stores(self) -> (AppState, TestStores) {
        let repo = Arc::new(InMemoryUserRepo::with_users(self.users));

        let (lookup, users): (Arc<dyn UserLookup>, Arc<dyn UserRepo>) = if self.failing_store {
            let failing = Arc::new(FailingUserRepo);
            (
                failing.clone() as Arc<dyn UserLookup>,
                failing as Arc<dyn UserRepo>,
            )
        } else {
            (
                repo.clone() as Arc<dyn UserLookup>,
                repo.clone() as Arc<dyn UserRepo>,
            )
        };

        let config = Arc::new(test_config());
        let rate_limiter: Arc<dyn RateLimiterTrait> = match self.max_per_ip {
            Some(max) => Arc::new(InMemoryRateLimiter::new(max)),
            None => Arc::new(InMemoryRateLimiter::permissive()),
        };

        let meal_plans = Arc::new(InMemoryMealPlanRepo::new());
        let nutrition = Arc::new(StubNutritionLookup::new());
        let (generator, coach) = if self.ai_unavailable {
            (
                Arc::new(StubMealPlanGenerator::unavailable()),
                Arc::new(StubCoachClient::unavailable()),
            )
        } else {
            (
                Arc::new(StubMealPlanGenerator::new()),
                Arc::new(StubCoachClient::new()),
            )
        };

        let app_state = AppState {
            identity_use_cases: Arc::new(IdentityUseCases::new(lookup)),
            auth_use_cases: Arc::new(AuthUseCases::new(
                users,
                config.jwt.clone(),
                TEST_BCRYPT_COST,
            )),
            meal_plan_use_cases: Arc::new(MealPlanUseCases::new(
                meal_plans.clone() as Arc<dyn MealPlanRepo>,
                generator.clone() as Arc<dyn MealPlanGenerator>,
                nutrition.clone() as Arc<dyn NutritionLookup>,
            )),
            coach_use_cases: Arc::new(CoachUseCases::new(coach.clone() as Arc<dyn CoachClient>)),
            config,
            rate_limiter,
        };
        let stores = TestStores {
            users: repo,
            meal_plans,
            generator,
            nutrition,
            coach,
        };
        (app_state, stores)
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        jwt: Arc::new(test_jwt_config(TEST_JWT_SECRET)),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        database_url: "postgres://unused".to_string(),
        cors_origins: vec![HeaderValue::from_static("http://localhost:3000")],
        redis_url: "redis://unused".to_string(),
        rate_limit_window_secs: 60,
        rate_limit_per_ip: u64::MAX,
        trust_proxy: false,
        bcrypt_cost: TEST_BCRYPT_COST,
        log_file: None,
    }
}
