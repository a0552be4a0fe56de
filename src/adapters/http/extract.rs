//! Axum extractors for callers authenticated by bearer token.
//!
//! ```rust,ignore
//! async fn me(ActiveUser(identity): ActiveUser) -> Json<UserResponse> { ... }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppError,
    application::jwt,
    domain::entities::user::Identity,
    use_cases::identity::require_active,
};

/// Any caller holding a valid access token, active or not.
pub struct CurrentUser(pub Identity);

/// A caller holding a valid access token whose account is active.
pub struct ActiveUser(pub Identity);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::InvalidCredentials)?;

        let claims = jwt::decode_token(token, &state.config.jwt)?;
        let identity = state.identity_use_cases.resolve(&claims).await?;

        Ok(CurrentUser(identity))
    }
}

impl FromRequestParts<AppState> for ActiveUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(identity) = CurrentUser::from_request_parts(parts, state).await?;
        Ok(ActiveUser(require_active(identity)?))
    }
}

/// Token from an `Authorization: Bearer <token>` header. The scheme is case-insensitive.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
