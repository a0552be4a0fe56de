use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use time::{Duration, OffsetDateTime};

use crate::app_error::{AppError, AppResult};

/// Issuer stamped on tokens by the peer account service.
pub const PEER_ISSUER: &str = "fitness-tracker-api";
/// Audience the peer account service issues tokens for.
pub const PEER_AUDIENCE: &str = "fitness-tracker-client";
pub const ACCESS_TOKEN_TYPE: &str = "access";

// ============================================================================
// Shared Secret Configuration
// ============================================================================

/// Signing configuration shared with the peer service.
///
/// The secret must match the peer's byte for byte, otherwise none of its tokens
/// verify here.
pub struct JwtConfig {
    pub secret: SecretString,
    pub algorithm: Algorithm,
    pub expire_minutes: i64,
}

impl JwtConfig {
    pub fn access_token_ttl(&self) -> Duration {
        Duration::minutes(self.expire_minutes)
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.secret.expose_secret().as_bytes())
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.secret.expose_secret().as_bytes())
    }
}

/// Only symmetric algorithms make sense for a shared secret.
pub fn is_hmac_algorithm(algorithm: Algorithm) -> bool {
    matches!(
        algorithm,
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
    )
}

// ============================================================================
// Local Access Tokens
// ============================================================================

#[derive(Debug, Serialize)]
pub struct LocalAccessClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(rename = "type")]
    pub token_type: String,
}

/// Issue a local-format access token (`sub` = email, no issuer/audience).
pub fn issue_access_token(email: &str, config: &JwtConfig) -> AppResult<String> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let claims = LocalAccessClaims {
        sub: email.to_string(),
        iat: now,
        exp: now + config.access_token_ttl().whole_seconds(),
        token_type: ACCESS_TOKEN_TYPE.to_string(),
    };
    encode(&Header::new(config.algorithm), &claims, &config.encoding_key())
        .map_err(|e| AppError::Internal(e.to_string()))
}

// ============================================================================
// Dual-Format Decoding
// ============================================================================

/// Claim layouts accepted on inbound bearer tokens, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFormat {
    /// Issued by the peer account service: `userId`, `email`, `iss`, `aud`.
    Peer,
    /// Issued by this service: `sub` holds the email.
    Local,
}

impl TokenFormat {
    pub const ORDER: [TokenFormat; 2] = [TokenFormat::Peer, TokenFormat::Local];

    fn validation(self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        // An expired token is refused at its `exp`, with no grace period.
        validation.leeway = 0;
        match self {
            TokenFormat::Peer => {
                validation.set_issuer(&[PEER_ISSUER]);
                validation.set_audience(&[PEER_AUDIENCE]);
                validation.set_required_spec_claims(&["exp", "iss", "aud"]);
            }
            TokenFormat::Local => {
                validation.validate_aud = false;
            }
        }
        validation
    }

    fn normalize(self, raw: Map<String, Value>) -> NormalizedClaims {
        let (subject_id, email) = match self {
            TokenFormat::Peer => (
                string_claim(&raw, "userId"),
                string_claim(&raw, "email").or_else(|| string_claim(&raw, "sub")),
            ),
            TokenFormat::Local => (
                None,
                string_claim(&raw, "sub").or_else(|| string_claim(&raw, "email")),
            ),
        };
        let token_type = string_claim(&raw, "type");
        NormalizedClaims {
            format: self,
            subject_id,
            email,
            token_type,
            raw,
        }
    }
}

/// Format-independent view of a verified token.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedClaims {
    pub format: TokenFormat,
    pub subject_id: Option<String>,
    pub email: Option<String>,
    pub token_type: Option<String>,
    pub raw: Map<String, Value>,
}

/// Reasons a bearer token is refused. Only for internal diagnostics; callers see
/// a generic 401.
#[derive(Debug, Error)]
pub enum DecodeFailure {
    #[error("token rejected in every format ({})", describe_rejections(.0))]
    Rejected(Vec<(TokenFormat, jsonwebtoken::errors::Error)>),

    #[error("no identifier")]
    NoIdentifier,

    #[error("wrong token type")]
    WrongTokenType,
}

fn describe_rejections(rejections: &[(TokenFormat, jsonwebtoken::errors::Error)]) -> String {
    rejections
        .iter()
        .map(|(format, err)| format!("{format:?}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<DecodeFailure> for AppError {
    fn from(failure: DecodeFailure) -> Self {
        tracing::debug!(reason = %failure, "Bearer token refused");
        AppError::InvalidCredentials
    }
}

/// Verify `token` and normalize its claims, then apply the identifier and token
/// type checks.
pub fn decode_token(token: &str, config: &JwtConfig) -> Result<NormalizedClaims, DecodeFailure> {
    let claims = decode_claims(token, config)?;
    check_claims(claims)
}

/// Try each format in order; the first one whose signature and claim rules all
/// pass wins.
pub fn decode_claims(token: &str, config: &JwtConfig) -> Result<NormalizedClaims, DecodeFailure> {
    let key = config.decoding_key();
    let mut rejections = Vec::with_capacity(TokenFormat::ORDER.len());
    for format in TokenFormat::ORDER {
        match attempt(format, token, &key, config.algorithm) {
            Ok(claims) => return Ok(claims),
            Err(e) => rejections.push((format, e)),
        }
    }
    Err(DecodeFailure::Rejected(rejections))
}

fn attempt(
    format: TokenFormat,
    token: &str,
    key: &DecodingKey,
    algorithm: Algorithm,
) -> Result<NormalizedClaims, jsonwebtoken::errors::Error> {
    decode::<Map<String, Value>>(token, key, &format.validation(algorithm))
        .map(|data| format.normalize(data.claims))
}

/// Post-decode checks shared by both formats.
pub fn check_claims(claims: NormalizedClaims) -> Result<NormalizedClaims, DecodeFailure> {
    if claims.subject_id.is_none() && claims.email.is_none() {
        return Err(DecodeFailure::NoIdentifier);
    }
    if let Some(token_type) = &claims.token_type
        && token_type != ACCESS_TOKEN_TYPE
    {
        return Err(DecodeFailure::WrongTokenType);
    }
    Ok(claims)
}

/// Non-empty string claim, or `None`.
fn string_claim(raw: &Map<String, Value>, name: &str) -> Option<String> {
    raw.get(name)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
