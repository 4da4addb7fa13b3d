pub mod password;
pub mod session;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

/// Session token payload: the user id plus issue and expiry times
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(id: Uuid, expire_days: i64) -> Self {
        let now = Utc::now();
        Self {
            id,
            iat: now.timestamp(),
            exp: (now + Duration::days(expire_days)).timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

pub fn generate_jwt(user_id: Uuid, security: &SecurityConfig) -> Result<String, JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let claims = Claims::new(user_id, security.jwt_expire_days);
    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());

    encode(&Header::default(), &claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Verify signature and expiry and return the embedded claims
pub fn validate_jwt(token: &str, security: &SecurityConfig) -> Result<Claims, JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security(secret: &str) -> SecurityConfig {
        SecurityConfig {
            jwt_secret: secret.to_string(),
            jwt_expire_days: 30,
            cookie_expire_days: 30,
            secure_cookies: false,
            cors_origins: vec![],
        }
    }

    #[test]
    fn round_trips_user_id() {
        let id = Uuid::new_v4();
        let token = generate_jwt(id, &security("secret")).unwrap();
        let claims = validate_jwt(&token, &security("secret")).unwrap();
        assert_eq!(claims.id, id);
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 3600);
    }

    #[test]
    fn rejects_wrong_secret_and_garbage() {
        let token = generate_jwt(Uuid::new_v4(), &security("secret")).unwrap();
        assert!(validate_jwt(&token, &security("other")).is_err());
        assert!(validate_jwt("not.a.token", &security("secret")).is_err());
    }

    #[test]
    fn rejects_expired_tokens() {
        let mut config = security("secret");
        config.jwt_expire_days = -1;
        let token = generate_jwt(Uuid::new_v4(), &config).unwrap();
        assert!(matches!(validate_jwt(&token, &security("secret")), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(generate_jwt(Uuid::new_v4(), &security("")), Err(JwtError::InvalidSecret)));
    }
}
