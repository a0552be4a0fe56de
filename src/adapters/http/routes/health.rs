use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Fitness Tracker FastAPI Backend" }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
