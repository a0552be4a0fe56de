use crate::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::{
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DatabaseError),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, ErrorCode::InvalidCredentials)
            }
            AppError::AccountDeactivated => {
                (StatusCode::UNAUTHORIZED, ErrorCode::AccountDeactivated)
            }
            AppError::InactiveAccount => (StatusCode::BAD_REQUEST, ErrorCode::InactiveAccount),
            AppError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, ErrorCode::RateLimited),
            AppError::InvalidInput(_) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidInput),
            AppError::NotFound => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            AppError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, ErrorCode::ServiceUnavailable)
            }
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError),
        };

        // Server-side details stay in the logs.
        let message = if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
            None
        } else {
            tracing::debug!(error = %self, "Request rejected");
            match self {
                AppError::InvalidInput(msg) => Some(msg),
                other => Some(other.to_string()),
            }
        };

        let mut resp = error_resp(status, code, message);
        if code == ErrorCode::InvalidCredentials {
            resp.headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        resp
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: Option<String>) -> Response {
    let body = match message {
        Some(msg) => serde_json::json!({ "code": code.as_str(), "message": msg }),
        None => serde_json::json!({ "code": code.as_str() }),
    };
    (status, Json(body)).into_response()
}
