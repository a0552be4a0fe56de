use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::http::HeaderValue;
use env_helpers::get_env_default;
use jsonwebtoken::Algorithm;
use secrecy::SecretString;

use super::error::InfraError;
use crate::application::{
    jwt::{JwtConfig, is_hmac_algorithm},
    password::BCRYPT_COST,
};

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

pub struct AppConfig {
    /// Shared with the peer account service; read once here and never again.
    pub jwt: Arc<JwtConfig>,
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub cors_origins: Vec<HeaderValue>,
    pub redis_url: String,
    pub rate_limit_window_secs: u64,
    pub rate_limit_per_ip: u64,
    /// Whether to trust X-Forwarded-For headers. Set to true when behind a reverse proxy.
    /// SECURITY: Only enable this when the API is not directly exposed to the internet.
    pub trust_proxy: bool,
    pub bcrypt_cost: u32,
    /// Optional path for structured JSON logs.
    pub log_file: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, InfraError> {
        // No fallback secret: an unset secret would silently break every peer token.
        let jwt_secret = required_env("JWT_SECRET")?;
        let jwt_algorithm = parse_algorithm(&get_env_default(
            "JWT_ALGORITHM",
            String::from("HS256"),
        ))?;
        let jwt_expire_minutes: i64 = get_env_default("JWT_EXPIRE_MINUTES", 30);
        if jwt_expire_minutes <= 0 {
            return Err(InfraError::ConfigInvalid {
                var: "JWT_EXPIRE_MINUTES",
                reason: "must be positive".into(),
            });
        }

        let database_url = required_env("DATABASE_URL")?;
        let bind_addr: SocketAddr = get_env_default(
            "BIND_ADDR",
            SocketAddr::from(([127, 0, 0, 1], 8000)),
        );
        let cors_origins = parse_origins(&get_env_default(
            "CORS_ORIGINS",
            DEFAULT_CORS_ORIGINS.to_string(),
        ))?;
        let redis_url: String = get_env_default("REDIS_URL", "redis://127.0.0.1:6379".to_string());
        let rate_limit_window_secs: u64 = get_env_default("RATE_LIMIT_WINDOW_SECS", 60);
        let rate_limit_per_ip: u64 = get_env_default("RATE_LIMIT_PER_IP", 120);
        // Default to false for security - must explicitly enable when behind a trusted proxy
        let trust_proxy: bool = get_env_default("TRUST_PROXY", false);
        let bcrypt_cost: u32 = get_env_default("BCRYPT_COST", BCRYPT_COST);
        let log_file = std::env::var("LOG_FILE").ok().filter(|p| !p.is_empty());

        Ok(Self {
            jwt: Arc::new(JwtConfig {
                secret: SecretString::new(jwt_secret.into()),
                algorithm: jwt_algorithm,
                expire_minutes: jwt_expire_minutes,
            }),
            bind_addr,
            database_url,
            cors_origins,
            redis_url,
            rate_limit_window_secs,
            rate_limit_per_ip,
            trust_proxy,
            bcrypt_cost,
            log_file,
        })
    }
}

fn required_env(var: &'static str) -> Result<String, InfraError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(InfraError::ConfigMissing { var }),
    }
}

fn parse_algorithm(raw: &str) -> Result<Algorithm, InfraError> {
    let algorithm = Algorithm::from_str(raw.trim()).map_err(|e| InfraError::ConfigInvalid {
        var: "JWT_ALGORITHM",
        reason: e.to_string(),
    })?;
    if !is_hmac_algorithm(algorithm) {
        return Err(InfraError::ConfigInvalid {
            var: "JWT_ALGORITHM",
            reason: "only HS256, HS384 and HS512 work with a shared secret".into(),
        });
    }
    Ok(algorithm)
}

fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, InfraError> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            origin.parse().map_err(|_| InfraError::ConfigInvalid {
                var: "CORS_ORIGINS",
                reason: format!("{origin} is not a valid header value"),
            })
        })
        .collect()
}
