use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::{AppConfig, DEFAULT_TOKEN_TTL_SECONDS};
use shared_models::auth::{JwtHeader, Principal, Role, TokenClaims};
use shared_models::error::AppError;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

/// Longest session a token may grant.
const MAX_TOKEN_TTL_DAYS: i64 = 366;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("JWT secret is not set")]
    MissingSecret,

    #[error("Invalid token format")]
    Malformed,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Token expired")]
    Expired,
}

/// A missing secret is a server fault. Every other failure is the caller's.
impl From<TokenError> for AppError {
    fn from(error: TokenError) -> Self {
        match error {
            TokenError::MissingSecret => AppError::Internal(error.to_string()),
            other => AppError::Unauthenticated(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies the signed, time-bounded session capability.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    secret: String,
    ttl: Duration,
}

impl TokenIssuer {
    /// A TTL that is not positive or longer than a year falls back to the
    /// default.
    pub fn new(secret: impl Into<String>, ttl_seconds: i64) -> Self {
        let ttl = Duration::try_seconds(ttl_seconds)
            .filter(|ttl| *ttl > Duration::zero() && *ttl <= Duration::days(MAX_TOKEN_TTL_DAYS))
            .unwrap_or_else(|| {
                warn!(
                    "Token TTL of {}s is out of range, using {}s",
                    ttl_seconds, DEFAULT_TOKEN_TTL_SECONDS
                );
                Duration::seconds(DEFAULT_TOKEN_TTL_SECONDS)
            });

        Self {
            secret: secret.into(),
            ttl,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.session_jwt_secret.clone(), config.session_token_ttl_seconds)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, principal_id: Uuid, role: Role) -> Result<IssuedToken, TokenError> {
        self.issue_at(principal_id, role, Utc::now())
    }

    pub fn issue_at(
        &self,
        principal_id: Uuid,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = issued_at + self.ttl;
        let claims = TokenClaims {
            sub: principal_id.to_string(),
            role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = sign_claims(&claims, &self.secret)?;
        debug!("Issued {} token for principal {}", role, principal_id);
        Ok(IssuedToken { token, expires_at })
    }

    pub fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        validate_token(token, &self.secret)
    }
}

fn mac_for(secret: &str) -> Result<HmacSha256, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }
    // HMAC accepts keys of any length.
    HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| TokenError::MissingSecret)
}

pub fn sign_claims(claims: &TokenClaims, jwt_secret: &str) -> Result<String, TokenError> {
    let mut mac = mac_for(jwt_secret)?;

    let header = JwtHeader {
        alg: ALGORITHM.to_string(),
        typ: "JWT".to_string(),
    };
    let header_json = serde_json::to_vec(&header).map_err(|_| TokenError::Malformed)?;
    let claims_json = serde_json::to_vec(claims).map_err(|_| TokenError::Malformed)?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(claims_json)
    );
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", signing_input, signature))
}

pub fn validate_token(token: &str, jwt_secret: &str) -> Result<Principal, TokenError> {
    let mut mac = mac_for(jwt_secret)?;

    // Split token into parts
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(TokenError::Malformed);
    }

    let header_b64 = parts[0];
    let claims_b64 = parts[1];
    let signature_b64 = parts[2];

    let signature = URL_SAFE_NO_PAD.decode(signature_b64).map_err(|e| {
        debug!("Failed to decode signature: {}", e);
        TokenError::Malformed
    })?;

    mac.update(format!("{}.{}", header_b64, claims_b64).as_bytes());
    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err(TokenError::InvalidSignature);
    }

    let header: JwtHeader = decode_segment(header_b64)?;
    if header.alg != ALGORITHM {
        return Err(TokenError::UnsupportedAlgorithm(header.alg));
    }

    let claims: TokenClaims = decode_segment(claims_b64)?;

    let now = Utc::now().timestamp();
    if claims.exp <= now {
        debug!("Token expired at {} (now: {})", claims.exp, now);
        return Err(TokenError::Expired);
    }

    let principal_id = Uuid::parse_str(&claims.sub).map_err(|_| TokenError::Malformed)?;
    if let Some(issued) = Utc.timestamp_opt(claims.iat, 0).single() {
        debug!("Token validated for principal {} (issued {})", principal_id, issued);
    }

    Ok(Principal::new(principal_id, claims.role))
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD.decode(segment).map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        debug!("Failed to parse token segment: {}", e);
        TokenError::Malformed
    })
}
