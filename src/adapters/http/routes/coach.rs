use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Serialize;

use crate::{
    adapters::http::{app_state::AppState, extract::ActiveUser},
    app_error::AppResult,
    use_cases::coach::{ChatRequest, ChatResponse},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat))
        .route("/suggestions", get(suggestions))
}

#[derive(Serialize)]
struct SuggestionsResponse {
    success: bool,
    suggestions: Vec<String>,
    message: Option<String>,
}

/// POST /api/aicoach/chat
async fn chat(
    State(app_state): State<AppState>,
    ActiveUser(identity): ActiveUser,
    Json(request): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    let response = app_state.coach_use_cases.chat(&identity, request).await?;
    Ok(Json(response))
}

/// GET /api/aicoach/suggestions
async fn suggestions(
    State(app_state): State<AppState>,
    ActiveUser(identity): ActiveUser,
) -> Json<SuggestionsResponse> {
    Json(SuggestionsResponse {
        success: true,
        suggestions: app_state.coach_use_cases.suggestions(identity.profile()),
        message: None,
    })
}
