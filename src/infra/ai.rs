use async_trait::async_trait;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::meal_plan::{DayMealPlan, MealPlanRequest, NutritionInfo},
    use_cases::{
        coach::{CoachClient, CoachContext, CoachReply, ConversationMessage},
        meal_plan::{MealPlanGenerator, NutritionLookup},
    },
};

const NOT_CONFIGURED: &str = "AI service is not configured";

/// Stand-in for the generative AI backend when none is configured.
///
/// Meal plan generation fails with `ServiceUnavailable`, the coach answers with
/// its unavailable reply, and nutrition lookups return no data. Plan storage
/// and the suggestion list keep working.
#[derive(Clone, Copy, Default)]
pub struct UnconfiguredAiService;

#[async_trait]
impl MealPlanGenerator for UnconfiguredAiService {
    async fn generate(&self, _request: &MealPlanRequest) -> AppResult<DayMealPlan> {
        Err(AppError::ServiceUnavailable(NOT_CONFIGURED.into()))
    }
}

#[async_trait]
impl NutritionLookup for UnconfiguredAiService {
    async fn ingredient_nutrition(&self, _ingredient: &str) -> AppResult<Option<NutritionInfo>> {
        Ok(None)
    }
}

#[async_trait]
impl CoachClient for UnconfiguredAiService {
    async fn reply(
        &self,
        _context: &CoachContext,
        _history: &[ConversationMessage],
        _message: &str,
    ) -> AppResult<CoachReply> {
        Err(AppError::ServiceUnavailable(NOT_CONFIGURED.into()))
    }
}
