use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::{
        meal_plan::{
            DayMealPlan, DietProfile, MealPlan, MealPlanId, MealPlanRequest, NutritionInfo,
        },
        user::{Identity, UserId},
    },
};

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const MAX_PAGE_LIMIT: u32 = 100;
/// Upper bound on food items per nutrition analysis.
pub const MAX_FOOD_ITEMS: usize = 50;

// ============================================================================
// Collaborators
// ============================================================================

/// Meal plans, always accessed through their owner's id.
#[async_trait]
pub trait MealPlanRepo: Send + Sync {
    async fn insert(&self, plan: &MealPlan) -> AppResult<()>;
    /// Newest first.
    async fn list_for_user(
        &self,
        user_id: &str,
        limit: u32,
        skip: u32,
    ) -> AppResult<Vec<MealPlan>>;
    async fn get(&self, user_id: &str, plan_id: &MealPlanId) -> AppResult<Option<MealPlan>>;
    /// Returns whether a plan was deleted.
    async fn delete(&self, user_id: &str, plan_id: &MealPlanId) -> AppResult<bool>;
    async fn delete_all_for_user(&self, user_id: &str) -> AppResult<u64>;
    /// Overwrite the plan with the same id and owner. Returns whether one matched.
    async fn replace(&self, plan: &MealPlan) -> AppResult<bool>;
}

/// Produces one day of meals for a request. Backed by the AI service.
#[async_trait]
pub trait MealPlanGenerator: Send + Sync {
    async fn generate(&self, request: &MealPlanRequest) -> AppResult<DayMealPlan>;
}

/// Nutrition estimate for a single ingredient line such as `"200g chicken breast"`.
#[async_trait]
pub trait NutritionLookup: Send + Sync {
    async fn ingredient_nutrition(&self, ingredient: &str) -> AppResult<Option<NutritionInfo>>;
}

// ============================================================================
// Inputs
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Page {
    pub limit: Option<u32>,
    pub skip: Option<u32>,
}

impl Page {
    fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
    }

    fn skip(&self) -> u32 {
        self.skip.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NutritionQuery {
    pub food_items: Vec<String>,
    #[serde(default)]
    pub portions: Option<Vec<String>>,
}

// ============================================================================
// Use Cases
// ============================================================================

pub struct MealPlanUseCases {
    plans: Arc<dyn MealPlanRepo>,
    generator: Arc<dyn MealPlanGenerator>,
    nutrition: Arc<dyn NutritionLookup>,
}

impl MealPlanUseCases {
    pub fn new(
        plans: Arc<dyn MealPlanRepo>,
        generator: Arc<dyn MealPlanGenerator>,
        nutrition: Arc<dyn NutritionLookup>,
    ) -> Self {
        Self {
            plans,
            generator,
            nutrition,
        }
    }

    /// Generate and store a plan. With `regenerate` set, the owner's earlier
    /// plans are removed once generation has succeeded.
    #[instrument(skip_all)]
    pub async fn generate(
        &self,
        identity: &Identity,
        request: MealPlanRequest,
    ) -> AppResult<MealPlan> {
        let owner = plan_owner(identity)?;
        let meals = self.generator.generate(&request).await?.with_totals();

        if request.regenerate {
            let removed = self.plans.delete_all_for_user(&owner).await?;
            tracing::debug!(removed, "Replaced earlier meal plans");
        }

        let plan = MealPlan {
            id: MealPlanId::generate(),
            user_id: owner,
            meals,
            created_at: Utc::now(),
            preferences: request.preferences(),
        };
        self.plans.insert(&plan).await?;
        tracing::info!(plan_id = %plan.id, "Meal plan generated");
        Ok(plan)
    }

    pub async fn list(&self, identity: &Identity, page: &Page) -> AppResult<Vec<MealPlan>> {
        let owner = plan_owner(identity)?;
        self.plans
            .list_for_user(&owner, page.limit(), page.skip())
            .await
    }

    pub async fn get(&self, identity: &Identity, plan_id: &str) -> AppResult<MealPlan> {
        let owner = plan_owner(identity)?;
        let plan_id = MealPlanId::parse(plan_id).ok_or(AppError::NotFound)?;
        self.plans
            .get(&owner, &plan_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn delete(&self, identity: &Identity, plan_id: &str) -> AppResult<()> {
        let owner = plan_owner(identity)?;
        let plan_id = MealPlanId::parse(plan_id).ok_or(AppError::NotFound)?;
        if !self.plans.delete(&owner, &plan_id).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    /// Regenerate an existing plan in place from the caller's stored profile.
    /// The plan keeps its id.
    #[instrument(skip_all)]
    pub async fn regenerate(&self, identity: &Identity, plan_id: &str) -> AppResult<MealPlan> {
        let existing = self.get(identity, plan_id).await?;

        let mut request = MealPlanRequest::for_profile(DietProfile::from_user(identity.profile()));
        request.regenerate = true;
        let meals = self.generator.generate(&request).await?.with_totals();

        let plan = MealPlan {
            id: existing.id,
            user_id: existing.user_id,
            meals,
            created_at: Utc::now(),
            preferences: request.preferences(),
        };
        if !self.plans.replace(&plan).await? {
            // Deleted between the read and the write.
            return Err(AppError::NotFound);
        }
        tracing::info!(plan_id = %plan.id, "Meal plan regenerated");
        Ok(plan)
    }

    /// Nutrition per food item, keyed by the item as given. A failed lookup
    /// yields `None` for that item and does not fail the request.
    pub async fn analyze_nutrition(
        &self,
        query: &NutritionQuery,
    ) -> AppResult<BTreeMap<String, Option<NutritionInfo>>> {
        if query.food_items.len() > MAX_FOOD_ITEMS {
            return Err(AppError::InvalidInput(format!(
                "At most {MAX_FOOD_ITEMS} food items per request"
            )));
        }

        let mut results = BTreeMap::new();
        for (i, food_item) in query.food_items.iter().enumerate() {
            let portion = query.portions.as_ref().and_then(|p| p.get(i));
            let ingredient = match portion {
                Some(portion) => format!("{portion} {food_item}"),
                None => food_item.clone(),
            };
            let nutrition = match self.nutrition.ingredient_nutrition(&ingredient).await {
                Ok(nutrition) => nutrition,
                Err(err) => {
                    tracing::warn!(error = %err, "Nutrition lookup failed");
                    None
                }
            };
            results.insert(food_item.clone(), nutrition);
        }
        Ok(results)
    }
}

/// Owner id that meal plans are scoped to. A synthesized identity only has one
/// when its token carried a well-formed peer user id; the `temp_user_id`
/// sentinel is shared by every id-less token and cannot own plans.
pub fn plan_owner(identity: &Identity) -> AppResult<String> {
    match identity {
        Identity::Persisted(profile) => Ok(profile.id.clone()),
        Identity::Synthesized(profile) => UserId::parse(&profile.id)
            .map(|id| id.to_string())
            .ok_or_else(|| {
                AppError::InvalidInput("Meal plans require an account with a user id".into())
            }),
    }
}
