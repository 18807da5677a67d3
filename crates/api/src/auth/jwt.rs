//! Access-token verification.
//!
//! Tokens are HS256 JWTs whose subject is a username. They are issued by the
//! account service; this crate only checks them. [`generate_access_token`]
//! mints tokens with the same secret for tests and local tooling.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims read from an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Username of the caller.
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl Claims {
    /// Claims for `username`, valid for `ttl` from now.
    pub fn new(username: &str, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: username.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

/// Token verification settings, read once at startup.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared HMAC secret.
    pub secret: String,
    /// Lifetime of tokens minted by [`generate_access_token`], in minutes.
    pub access_token_expiry_mins: i64,
    /// Clock skew tolerated when checking `exp`, in seconds.
    pub leeway_secs: u64,
}

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60;
const DEFAULT_LEEWAY_SECS: u64 = 30;

impl JwtConfig {
    /// Load from `JWT_SECRET` (required), `JWT_ACCESS_EXPIRY_MINS` (60) and
    /// `JWT_LEEWAY_SECS` (30).
    ///
    /// # Panics
    ///
    /// Panics if the secret is missing or empty, or a number does not parse.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        assert!(!secret.trim().is_empty(), "JWT_SECRET must be set and non-empty");

        let access_token_expiry_mins = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .map(|v| v.parse().expect("JWT_ACCESS_EXPIRY_MINS must be an integer"))
            .unwrap_or(DEFAULT_ACCESS_EXPIRY_MINS);

        let leeway_secs = std::env::var("JWT_LEEWAY_SECS")
            .map(|v| v.parse().expect("JWT_LEEWAY_SECS must be a non-negative integer"))
            .unwrap_or(DEFAULT_LEEWAY_SECS);

        Self {
            secret,
            access_token_expiry_mins,
            leeway_secs,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

/// Mint an HS256 access token for `username`.
pub fn generate_access_token(username: &str, config: &JwtConfig) -> Result<String, JwtError> {
    let claims = Claims::new(username, Duration::minutes(config.access_token_expiry_mins));
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify signature and expiry, and reject a blank subject.
pub fn validate_token(token: &str, config: &JwtConfig) -> Result<Claims, JwtError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &config.validation(),
    )?
    .claims;

    if claims.sub.trim().is_empty() {
        return Err(ErrorKind::InvalidSubject.into());
    }
    Ok(claims)
}
