pub mod auth;
pub mod coach;
pub mod health;
pub mod meal_plan;

use axum::Router;

use crate::adapters::http::app_state::AppState;

/// Routes served under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/mealplan", meal_plan::router())
        .nest("/aicoach", coach::router())
}
