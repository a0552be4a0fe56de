use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::parse_json_with_fallback;
use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::meal_plan::{MealPlan, MealPlanId},
    use_cases::meal_plan::MealPlanRepo,
};

const SELECT_MEAL_PLAN: &str = r#"
    SELECT id, user_id, meals, preferences, created_at
    FROM meal_plans
"#;

#[derive(sqlx::FromRow, Debug)]
pub struct MealPlanDb {
    pub id: String,
    pub user_id: String,
    pub meals: Value,
    pub preferences: Value,
    pub created_at: DateTime<Utc>,
}

impl MealPlanDb {
    /// Rows whose id is not a plan id are skipped with a warning.
    fn into_plan(self) -> Option<MealPlan> {
        let Some(id) = MealPlanId::parse(&self.id) else {
            tracing::warn!(entity_id = %self.id, "Malformed meal plan id in database, skipping");
            return None;
        };
        Some(MealPlan {
            meals: parse_json_with_fallback(&self.meals, "meals", &self.id),
            preferences: parse_json_with_fallback(&self.preferences, "preferences", &self.id),
            id,
            user_id: self.user_id,
            created_at: self.created_at,
        })
    }
}

fn json_columns(plan: &MealPlan) -> AppResult<(Value, Value)> {
    let meals = serde_json::to_value(&plan.meals).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok((meals, Value::Object(plan.preferences.clone())))
}

#[async_trait]
impl MealPlanRepo for PostgresPersistence {
    async fn insert(&self, plan: &MealPlan) -> AppResult<()> {
        let (meals, preferences) = json_columns(plan)?;
        sqlx::query(
            r#"INSERT INTO meal_plans (id, user_id, meals, preferences, created_at)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(plan.id.as_str())
        .bind(&plan.user_id)
        .bind(meals)
        .bind(preferences)
        .bind(plan.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        limit: u32,
        skip: u32,
    ) -> AppResult<Vec<MealPlan>> {
        let rows = sqlx::query_as::<_, MealPlanDb>(&format!(
            "{SELECT_MEAL_PLAN} WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(user_id)
        .bind(i64::from(limit))
        .bind(i64::from(skip))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().filter_map(MealPlanDb::into_plan).collect())
    }

    async fn get(&self, user_id: &str, plan_id: &MealPlanId) -> AppResult<Option<MealPlan>> {
        let row = sqlx::query_as::<_, MealPlanDb>(&format!(
            "{SELECT_MEAL_PLAN} WHERE id = $1 AND user_id = $2"
        ))
        .bind(plan_id.as_str())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.and_then(MealPlanDb::into_plan))
    }

    async fn delete(&self, user_id: &str, plan_id: &MealPlanId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM meal_plans WHERE id = $1 AND user_id = $2")
            .bind(plan_id.as_str())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_for_user(&self, user_id: &str) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM meal_plans WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn replace(&self, plan: &MealPlan) -> AppResult<bool> {
        let (meals, preferences) = json_columns(plan)?;
        let result = sqlx::query(
            r#"UPDATE meal_plans
               SET meals = $3, preferences = $4, created_at = $5
               WHERE id = $1 AND user_id = $2"#,
        )
        .bind(plan.id.as_str())
        .bind(&plan.user_id)
        .bind(meals)
        .bind(preferences)
        .bind(plan.created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
