use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: impl Into<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            user_id: user_id.into(),
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("JWT secret not configured")]
    InvalidSecret,
}

/// HS256 signing material shared by the auth gate and the token CLI
#[derive(Clone)]
pub struct JwtKeys {
    secret: String,
    expiry_hours: u64,
}

impl JwtKeys {
    pub fn new(secret: impl Into<String>, expiry_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expiry_hours,
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(security.jwt_secret.clone(), security.jwt_expiry_hours)
    }

    pub fn is_configured(&self) -> bool {
        !self.secret.is_empty()
    }

    pub fn generate_jwt(&self, user_id: &str) -> Result<String, JwtError> {
        if !self.is_configured() {
            return Err(JwtError::InvalidSecret);
        }

        let claims = Claims::new(user_id, self.expiry_hours);
        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());

        encode(&Header::default(), &claims, &encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Verify signature and expiry, returning the embedded claims
    pub fn decode_jwt(&self, token: &str) -> Result<Claims, JwtError> {
        if !self.is_configured() {
            return Err(JwtError::InvalidSecret);
        }

        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
            .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

        if token_data.claims.user_id.trim().is_empty() {
            return Err(JwtError::InvalidToken("missing user id".to_string()));
        }

        Ok(token_data.claims)
    }
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys")
            .field("secret", &"<redacted>")
            .field("expiry_hours", &self.expiry_hours)
            .finish()
    }
}
