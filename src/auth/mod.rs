//! Session token issuance and password hashing.

mod extractor;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub use extractor::AuthedUser;

const TOKEN_ISSUER: &str = "worklog-server";

/// Claims carried by a session JWT.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// HS256 signing and verification keys, shared as app data.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_hours: i64,
}

impl JwtKeys {
    pub fn new(secret: &str, expiry_hours: i64) -> Self {
        JwtKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours,
        }
    }

    /// Issue a session token for a user.
    pub fn create_token(&self, user_id: Uuid) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.expiry_hours)).timestamp(),
            iss: TOKEN_ISSUER.to_string(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Unauthorized(format!("failed to issue token: {}", e)))
    }

    /// Validate a session token and return the user ID it was issued for.
    pub fn validate_token(&self, token: &str) -> AppResult<Uuid> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| AppError::Unauthorized("invalid or expired token".to_string()))?;

        Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AppError::Unauthorized("malformed token subject".to_string()))
    }
}

/// Hex-encoded SHA-256 of a password.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify a password against a stored hash.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    hash_password(password) == stored_hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let keys = JwtKeys::new("test-secret", 1);
        let user_id = Uuid::new_v4();
        let token = keys.create_token(user_id).unwrap();
        assert_eq!(keys.validate_token(&token).unwrap(), user_id);
    }

    #[test]
    fn test_token_wrong_secret_rejected() {
        let keys = JwtKeys::new("secret-a", 1);
        let other = JwtKeys::new("secret-b", 1);
        let token = keys.create_token(Uuid::new_v4()).unwrap();
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let keys = JwtKeys::new("test-secret", 1);
        assert!(keys.validate_token("not-a-jwt").is_err());
    }

    #[test]
    fn test_password_hash_verify() {
        let hash = hash_password("hunter2");
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }
}
