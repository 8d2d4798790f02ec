//! JWT token generation and validation

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// JWT claims structure for HumanTic-issued tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// User role
    pub role: String,
    /// Email
    pub email: String,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
    /// JWT ID for session tracking and revocation
    pub jti: String,
}

/// JWT manager for token operations
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
}

impl JwtManager {
    /// Create a new JWT manager
    pub fn new(secret: &str, token_expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expiry_hours,
        }
    }

    /// Generate a token with unique JTI for session tracking
    pub fn generate_token(
        &self,
        user_id: Uuid,
        role: &str,
        email: &str,
    ) -> Result<(String, String), JwtError> {
        let now = OffsetDateTime::now_utc();
        let exp = now + Duration::hours(self.token_expiry_hours);
        let jti = Uuid::new_v4().to_string();

        let claims = Claims {
            sub: user_id,
            role: role.to_string(),
            email: email.to_string(),
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
            jti: jti.clone(),
        };

        // Explicit algorithm prevents algorithm confusion attacks
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::Encoding(e.to_string()))?;

        Ok((token, jti))
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 60; // 60 second clock skew tolerance

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidToken => JwtError::Invalid,
                jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => JwtError::Invalid,
                _ => JwtError::Validation(e.to_string()),
            })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
    #[error("Token encoding failed: {0}")]
    Encoding(String),
    #[error("Token validation failed: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_generation_and_validation() {
        let jwt = JwtManager::new("test-secret-key-at-least-32-chars!", 24);
        let user_id = Uuid::new_v4();

        let (token, jti) = jwt
            .generate_token(user_id, "client", "test@example.com")
            .expect("Failed to generate token");

        let claims = jwt.validate_token(&token).expect("Invalid token");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, "client");
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.jti, jti);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let jwt = JwtManager::new("test-secret-key-at-least-32-chars!", 24);
        let other = JwtManager::new("other-secret-key-at-least-32-char!", 24);

        let (token, _jti) = other
            .generate_token(Uuid::new_v4(), "admin", "evil@example.com")
            .expect("Failed to generate token");

        assert!(jwt.validate_token(&token).is_err());
    }
}
