use std::str::FromStr;

use sqlx::PgPool;

use crate::app_error::AppError;

pub mod meal_plan;
pub mod user;

const MAX_JSON_LOG_LEN: usize = 200;

/// Parse a JSONB column into `T`, logging a warning and falling back to
/// `T::default()` when the stored value does not fit.
///
/// SQL NULL arrives as `Value::Null` and is returned as the default without
/// logging.
pub fn parse_json_with_fallback<T: serde::de::DeserializeOwned + Default>(
    json: &serde_json::Value,
    field_name: &str,
    entity_id: &str,
) -> T {
    if json.is_null() {
        return T::default();
    }

    serde_json::from_value(json.clone()).unwrap_or_else(|err| {
        let raw: String = json.to_string().chars().take(MAX_JSON_LOG_LEN).collect();
        tracing::warn!(
            field = field_name,
            entity_id = entity_id,
            raw_json = %raw,
            error = %err,
            "Failed to parse JSON column, using default value"
        );
        T::default()
    })
}

/// Parse a stored enum value, logging a warning and falling back to `None` when
/// the text is not a known variant.
///
/// NULL is a valid empty state and is returned as `None` without logging.
pub fn parse_enum_with_fallback<T: FromStr>(
    raw: Option<&str>,
    field_name: &str,
    entity_id: &str,
) -> Option<T> {
    let raw = raw?;
    match T::from_str(raw) {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(
                field = field_name,
                entity_id = entity_id,
                raw_value = %raw,
                "Unknown enum value in database, ignoring"
            );
            None
        }
    }
}

/// List version of [`parse_enum_with_fallback`]: unknown entries are dropped.
pub fn parse_enum_list_with_fallback<T: FromStr>(
    raw: Option<Vec<String>>,
    field_name: &str,
    entity_id: &str,
) -> Vec<T> {
    raw.unwrap_or_default()
        .iter()
        .filter_map(|value| parse_enum_with_fallback(Some(value), field_name, entity_id))
        .collect()
}

#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        PostgresPersistence { pool }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound,
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                // PostgreSQL unique violation
                if msg.contains("duplicate key") || msg.contains("unique constraint") {
                    AppError::InvalidInput(
                        "User with this email or username already exists".into(),
                    )
                }
                // PostgreSQL not-null violation
                else if msg.contains("null value") && msg.contains("violates not-null") {
                    AppError::InvalidInput("Required field is missing".into())
                } else {
                    // Log the actual error for debugging, but don't expose details
                    tracing::error!(error = ?err, "Database error");
                    AppError::Database("Database operation failed".into())
                }
            }
            _ => {
                tracing::error!(error = ?err, "Database error");
                AppError::Database("Database operation failed".into())
            }
        }
    }
}
