//! In-memory meal plan store and stub AI collaborators.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Duration;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::meal_plan::{
        DayMealPlan, MealPlan, MealPlanId, MealPlanRequest, NutritionInfo,
    },
    test_utils::{sample_day_plan, test_datetime},
    use_cases::{
        coach::{CoachClient, CoachContext, CoachReply, ConversationMessage},
        meal_plan::{MealPlanGenerator, MealPlanRepo, NutritionLookup},
    },
};

// ============================================================================
// InMemoryMealPlanRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryMealPlanRepo {
    plans: Mutex<Vec<MealPlan>>,
}

impl InMemoryMealPlanRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a plan for `user_id`. Each seeded plan is one minute newer than
    /// the previous one.
    pub fn seed(&self, user_id: &str, meals: DayMealPlan) -> MealPlan {
        let mut plans = self.plans.lock().unwrap();
        let plan = MealPlan {
            id: MealPlanId::generate(),
            user_id: user_id.to_string(),
            meals,
            created_at: test_datetime() + Duration::minutes(plans.len() as i64),
            preferences: Default::default(),
        };
        plans.push(plan.clone());
        plan
    }

    /// Plans owned by `user_id`, in insertion order.
    pub fn plans_of(&self, user_id: &str) -> Vec<MealPlan> {
        self.plans
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MealPlanRepo for InMemoryMealPlanRepo {
    async fn insert(&self, plan: &MealPlan) -> AppResult<()> {
        self.plans.lock().unwrap().push(plan.clone());
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        limit: u32,
        skip: u32,
    ) -> AppResult<Vec<MealPlan>> {
        let mut plans = self.plans_of(user_id);
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(plans
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn get(&self, user_id: &str, plan_id: &MealPlanId) -> AppResult<Option<MealPlan>> {
        Ok(self
            .plans
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.user_id == user_id && &p.id == plan_id)
            .cloned())
    }

    async fn delete(&self, user_id: &str, plan_id: &MealPlanId) -> AppResult<bool> {
        let mut plans = self.plans.lock().unwrap();
        let before = plans.len();
        plans.retain(|p| !(p.user_id == user_id && &p.id == plan_id));
        Ok(plans.len() < before)
    }

    async fn delete_all_for_user(&self, user_id: &str) -> AppResult<u64> {
        let mut plans = self.plans.lock().unwrap();
        let before = plans.len();
        plans.retain(|p| p.user_id != user_id);
        Ok((before - plans.len()) as u64)
    }

    async fn replace(&self, plan: &MealPlan) -> AppResult<bool> {
        let mut plans = self.plans.lock().unwrap();
        match plans
            .iter_mut()
            .find(|p| p.user_id == plan.user_id && p.id == plan.id)
        {
            Some(stored) => {
                *stored = plan.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ============================================================================
// StubMealPlanGenerator
// ============================================================================

/// Returns `sample_day_plan()` for every request and remembers the last one.
#[derive(Default)]
pub struct StubMealPlanGenerator {
    unavailable: bool,
    last_request: Mutex<Option<MealPlanRequest>>,
}

impl StubMealPlanGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with `ServiceUnavailable`.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn last_request(&self) -> Option<MealPlanRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl MealPlanGenerator for StubMealPlanGenerator {
    async fn generate(&self, request: &MealPlanRequest) -> AppResult<DayMealPlan> {
        *self.last_request.lock().unwrap() = Some(request.clone());
        if self.unavailable {
            return Err(AppError::ServiceUnavailable("generator offline".into()));
        }
        Ok(sample_day_plan())
    }
}

// ============================================================================
// StubNutritionLookup
// ============================================================================

/// Answers from a fixed table; unknown ingredients have no data.
#[derive(Default)]
pub struct StubNutritionLookup {
    table: Mutex<HashMap<String, NutritionInfo>>,
    failing: Mutex<HashSet<String>>,
    queries: Mutex<Vec<String>>,
}

impl StubNutritionLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, ingredient: &str, info: NutritionInfo) {
        self.table
            .lock()
            .unwrap()
            .insert(ingredient.to_string(), info);
    }

    /// Lookups of `ingredient` fail with a database-style error.
    pub fn fail_on(&self, ingredient: &str) {
        self.failing.lock().unwrap().insert(ingredient.to_string());
    }

    /// Every ingredient line asked for, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl NutritionLookup for StubNutritionLookup {
    async fn ingredient_nutrition(&self, ingredient: &str) -> AppResult<Option<NutritionInfo>> {
        self.queries.lock().unwrap().push(ingredient.to_string());
        if self.failing.lock().unwrap().contains(ingredient) {
            return Err(AppError::Internal("lookup failed".into()));
        }
        Ok(self.table.lock().unwrap().get(ingredient).cloned())
    }
}

// ============================================================================
// StubCoachClient
// ============================================================================

type CoachCall = (CoachContext, Vec<ConversationMessage>, String);

enum CoachMode {
    Echo,
    Unavailable,
    Failing,
}

/// Replies `"Coach reply to: <message>"` and remembers the last call.
pub struct StubCoachClient {
    mode: CoachMode,
    last_call: Mutex<Option<CoachCall>>,
}

impl StubCoachClient {
    fn with_mode(mode: CoachMode) -> Self {
        Self {
            mode,
            last_call: Mutex::new(None),
        }
    }

    pub fn new() -> Self {
        Self::with_mode(CoachMode::Echo)
    }

    pub fn unavailable() -> Self {
        Self::with_mode(CoachMode::Unavailable)
    }

    pub fn failing() -> Self {
        Self::with_mode(CoachMode::Failing)
    }

    pub fn last_call(&self) -> Option<CoachCall> {
        self.last_call.lock().unwrap().clone()
    }
}

#[async_trait]
impl CoachClient for StubCoachClient {
    async fn reply(
        &self,
        context: &CoachContext,
        history: &[ConversationMessage],
        message: &str,
    ) -> AppResult<CoachReply> {
        *self.last_call.lock().unwrap() =
            Some((context.clone(), history.to_vec(), message.to_string()));
        match self.mode {
            CoachMode::Echo => Ok(CoachReply {
                response: format!("Coach reply to: {message}"),
                recipes: None,
            }),
            CoachMode::Unavailable => Err(AppError::ServiceUnavailable("coach offline".into())),
            CoachMode::Failing => Err(AppError::Internal("upstream quota exceeded".into())),
        }
    }
}
