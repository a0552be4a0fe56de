use std::sync::Arc;

use crate::{
    infra::{RateLimiterTrait, config::AppConfig},
    use_cases::{
        coach::CoachUseCases, identity::IdentityUseCases, meal_plan::MealPlanUseCases,
        user::AuthUseCases,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub identity_use_cases: Arc<IdentityUseCases>,
    pub auth_use_cases: Arc<AuthUseCases>,
    pub meal_plan_use_cases: Arc<MealPlanUseCases>,
    pub coach_use_cases: Arc<CoachUseCases>,
    pub rate_limiter: Arc<dyn RateLimiterTrait>,
}
