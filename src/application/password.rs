use crate::app_error::{AppError, AppResult};

/// Default bcrypt work factor for new hashes.
pub const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

/// Hash a password with a fresh salt.
pub fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    bcrypt::hash(password, cost).map_err(|e| AppError::Internal(e.to_string()))
}

/// Check a password against a stored hash.
///
/// A malformed or foreign hash never matches; it is not an error.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(matches) => matches,
        Err(err) => {
            tracing::debug!(error = %err, "Stored password hash could not be checked");
            false
        }
    }
}

/// Runs [`hash_password`] on the blocking pool.
pub async fn hash_password_blocking(password: String, cost: u32) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {e}")))?
}

/// Runs [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(password: String, hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {e}")))
}
